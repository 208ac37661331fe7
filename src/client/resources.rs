//! Typed convenience surface: one thin method per API operation.
//!
//! These are JSON glue over [`ApiClient::request`]; resource payloads
//! stay as `serde_json::Value` since the marketplace schema belongs to
//! the backend.

use reqwest::Method;
use serde_json::{json, Value};

use crate::client::{ApiClient, ApiError, RequestOptions};

impl ApiClient {
    async fn get_json(&self, path: &str, auth: bool) -> Result<Value, ApiError> {
        self.request(Method::GET, path, None, RequestOptions { auth, headers: Vec::new() })
            .await
    }

    async fn post_json(&self, path: &str, body: Value, auth: bool) -> Result<Value, ApiError> {
        self.request(
            Method::POST,
            path,
            Some(body),
            RequestOptions { auth, headers: Vec::new() },
        )
        .await
    }

    async fn put_json(&self, path: &str, body: Value, auth: bool) -> Result<Value, ApiError> {
        self.request(
            Method::PUT,
            path,
            Some(body),
            RequestOptions { auth, headers: Vec::new() },
        )
        .await
    }

    async fn delete_json(&self, path: &str) -> Result<Value, ApiError> {
        self.request(Method::DELETE, path, None, RequestOptions::authenticated())
            .await
    }

    // -- Auth -----------------------------------------------------------

    /// Log in and remember the returned bearer token for later calls.
    pub async fn login(&self, email: &str, password: &str) -> Result<Value, ApiError> {
        let body = self
            .post_json(
                "/auth/login",
                json!({ "email": email, "password": password }),
                false,
            )
            .await?;
        if let Some(token) = body.get("token").and_then(Value::as_str) {
            self.tokens().set(token);
        }
        Ok(body)
    }

    pub async fn register(&self, details: Value) -> Result<Value, ApiError> {
        self.post_json("/auth/register", details, false).await
    }

    /// Log out and clear the stored bearer token.
    pub async fn logout(&self) -> Result<Value, ApiError> {
        let body = self.post_json("/auth/logout", json!({}), true).await?;
        self.tokens().clear();
        Ok(body)
    }

    pub async fn me(&self) -> Result<Value, ApiError> {
        self.get_json("/auth/me", true).await
    }

    // -- Users ----------------------------------------------------------

    pub async fn list_users(&self) -> Result<Value, ApiError> {
        self.get_json("/users", true).await
    }

    // -- Stores ---------------------------------------------------------

    pub async fn list_stores(&self) -> Result<Value, ApiError> {
        self.get_json("/stores", false).await
    }

    pub async fn get_store(&self, id: &str) -> Result<Value, ApiError> {
        self.get_json(&format!("/stores/{id}"), false).await
    }

    pub async fn create_store(&self, store: Value) -> Result<Value, ApiError> {
        self.post_json("/stores", store, true).await
    }

    pub async fn update_store(&self, id: &str, fields: Value) -> Result<Value, ApiError> {
        self.put_json(&format!("/stores/{id}"), fields, true).await
    }

    pub async fn delete_store(&self, id: &str) -> Result<Value, ApiError> {
        self.delete_json(&format!("/stores/{id}")).await
    }

    // -- Products --------------------------------------------------------

    pub async fn list_products(&self) -> Result<Value, ApiError> {
        self.get_json("/products", false).await
    }

    pub async fn get_product(&self, id: &str) -> Result<Value, ApiError> {
        self.get_json(&format!("/products/{id}"), false).await
    }

    pub async fn create_product(&self, product: Value) -> Result<Value, ApiError> {
        self.post_json("/products", product, true).await
    }

    pub async fn update_product(&self, id: &str, fields: Value) -> Result<Value, ApiError> {
        self.put_json(&format!("/products/{id}"), fields, true).await
    }

    pub async fn delete_product(&self, id: &str) -> Result<Value, ApiError> {
        self.delete_json(&format!("/products/{id}")).await
    }

    // -- Companies -------------------------------------------------------

    pub async fn list_companies(&self) -> Result<Value, ApiError> {
        self.get_json("/companies", false).await
    }

    pub async fn get_company(&self, id: &str) -> Result<Value, ApiError> {
        self.get_json(&format!("/companies/{id}"), false).await
    }

    pub async fn create_company(&self, company: Value) -> Result<Value, ApiError> {
        self.post_json("/companies", company, true).await
    }

    pub async fn update_company(&self, id: &str, fields: Value) -> Result<Value, ApiError> {
        self.put_json(&format!("/companies/{id}"), fields, true).await
    }

    pub async fn delete_company(&self, id: &str) -> Result<Value, ApiError> {
        self.delete_json(&format!("/companies/{id}")).await
    }

    // -- Jobs ------------------------------------------------------------

    pub async fn list_jobs(&self) -> Result<Value, ApiError> {
        self.get_json("/jobs", false).await
    }

    pub async fn get_job(&self, id: &str) -> Result<Value, ApiError> {
        self.get_json(&format!("/jobs/{id}"), false).await
    }

    pub async fn create_job(&self, job: Value) -> Result<Value, ApiError> {
        self.post_json("/jobs", job, true).await
    }

    pub async fn update_job(&self, id: &str, fields: Value) -> Result<Value, ApiError> {
        self.put_json(&format!("/jobs/{id}"), fields, true).await
    }

    pub async fn delete_job(&self, id: &str) -> Result<Value, ApiError> {
        self.delete_json(&format!("/jobs/{id}")).await
    }

    // -- Orders ----------------------------------------------------------

    pub async fn list_orders(&self) -> Result<Value, ApiError> {
        self.get_json("/orders", true).await
    }

    pub async fn get_order(&self, id: &str) -> Result<Value, ApiError> {
        self.get_json(&format!("/orders/{id}"), true).await
    }

    pub async fn create_order(&self, order: Value) -> Result<Value, ApiError> {
        self.post_json("/orders", order, true).await
    }

    pub async fn update_order_status(&self, id: &str, status: &str) -> Result<Value, ApiError> {
        self.put_json(&format!("/orders/{id}/status"), json!({ "status": status }), true)
            .await
    }

    // -- Analytics -------------------------------------------------------

    pub async fn analytics(&self) -> Result<Value, ApiError> {
        self.get_json("/analytics", true).await
    }
}
