/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    pub admin_username: String,
    pub admin_password: String,
    pub jwt_secret: Option<String>,
    pub cors_origin: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse()
            .unwrap_or(5000);

        let database_path =
            std::env::var("DATABASE_PATH").unwrap_or_else(|_| "./feedbackhub.db".to_string());

        let admin_username =
            std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string());

        let admin_password =
            std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".to_string());

        // An empty secret counts as unconfigured
        let jwt_secret = std::env::var("JWT_SECRET").ok().filter(|s| !s.is_empty());

        let cors_origin = std::env::var("CORS_ORIGIN").ok();

        Ok(Self {
            host,
            port,
            database_path,
            admin_username,
            admin_password,
            jwt_secret,
            cors_origin,
        })
    }
}
