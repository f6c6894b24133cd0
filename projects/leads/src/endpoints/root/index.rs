/// Axum handler: GET /
pub async fn handler() -> &'static str {
    "Server is running!"
}
