use std::{env, io::Write, time::Duration as StdDuration};

use chrono::Duration;
use log::*;
use order_engine::{helpers::AddressAllowList, traits::DEFAULT_CART_TTL_HOURS};
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use serde_json::json;
use shop_common::{parse_boolean_flag, Secret};
use tempfile::NamedTempFile;
use yookassa_tools::YooKassaConfig;

use crate::errors::ServerError;

const DEFAULT_SHOP_HOST: &str = "127.0.0.1";
const DEFAULT_SHOP_PORT: u16 = 8080;
const DEFAULT_TOKEN_VALIDITY: Duration = Duration::hours(24);
const MIN_JWT_SECRET_LENGTH: usize = 32;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub auth: AuthConfig,
    /// The key that must be supplied in the `X-API-Key` header to use the admin routes.
    pub admin_api_key: Secret<String>,
    /// How long an untouched cart survives.
    pub cart_ttl: Duration,
    /// If true, the X-Forwarded-For header will be used to determine the client's IP address, rather than the
    /// connection's remote address. Only the last entry, the one appended by the proxy in front of the server, is
    /// used. Never set this unless such a proxy is in place, since clients can send the header themselves.
    pub use_x_forwarded_for: bool,
    /// If true, the Forwarded header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_forwarded: bool,
    /// Payment notifications are only accepted from these addresses.
    pub webhook_allow_list: AddressAllowList,
    pub yookassa: YooKassaConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SHOP_HOST.to_string(),
            port: DEFAULT_SHOP_PORT,
            database_url: String::default(),
            auth: AuthConfig::default(),
            admin_api_key: Secret::default(),
            cart_ttl: Duration::hours(DEFAULT_CART_TTL_HOURS),
            use_x_forwarded_for: false,
            use_forwarded: false,
            webhook_allow_list: AddressAllowList::yookassa_default(),
            yookassa: YooKassaConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("SHOP_HOST").ok().unwrap_or_else(|| DEFAULT_SHOP_HOST.into());
        let port = env::var("SHOP_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for SHOP_PORT. {e} Using the default, {DEFAULT_SHOP_PORT}, \
                         instead."
                    );
                    DEFAULT_SHOP_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_SHOP_PORT);
        let database_url = env::var("SHOP_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ SHOP_DATABASE_URL is not set. Please set it to the URL for the shop database.");
            String::default()
        });
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            warn!(
                "🪛️ Could not load the authentication configuration from environment variables. {e}. Reverting to the \
                 default configuration."
            );
            AuthConfig::default()
        });
        let admin_api_key = env::var("SHOP_ADMIN_API_KEY").ok().unwrap_or_else(|| {
            warn!("🪛️ SHOP_ADMIN_API_KEY is not set. The admin routes will refuse every request.");
            String::default()
        });
        let cart_ttl = configure_cart_ttl();
        let use_x_forwarded_for = parse_boolean_flag(env::var("SHOP_USE_X_FORWARDED_FOR").ok(), false);
        let use_forwarded = parse_boolean_flag(env::var("SHOP_USE_FORWARDED").ok(), false);
        let webhook_allow_list = configure_webhook_allow_list();
        let yookassa = YooKassaConfig::new_from_env_or_default();
        Self {
            host,
            port,
            database_url,
            auth,
            admin_api_key: Secret::new(admin_api_key),
            cart_ttl,
            use_x_forwarded_for,
            use_forwarded,
            webhook_allow_list,
            yookassa,
        }
    }
}

fn configure_cart_ttl() -> Duration {
    env::var("SHOP_CART_TTL_HOURS")
        .map_err(|_| info!("🪛️ SHOP_CART_TTL_HOURS is not set. Using the default value of {DEFAULT_CART_TTL_HOURS} hrs."))
        .and_then(|s| {
            s.parse::<i64>()
                .ok()
                .filter(|h| *h > 0)
                .map(Duration::hours)
                .ok_or_else(|| warn!("🪛️ Invalid configuration value for SHOP_CART_TTL_HOURS: {s}"))
        })
        .unwrap_or(Duration::hours(DEFAULT_CART_TTL_HOURS))
}

fn configure_webhook_allow_list() -> AddressAllowList {
    let list = match env::var("SHOP_WEBHOOK_IP_WHITELIST") {
        Ok(s) if !s.trim().is_empty() => AddressAllowList::parse_list(&s).unwrap_or_else(|e| {
            error!(
                "🪛️ SHOP_WEBHOOK_IP_WHITELIST is invalid. {e}. Falling back to the provider's published address list."
            );
            AddressAllowList::yookassa_default()
        }),
        _ => {
            info!("🪛️ SHOP_WEBHOOK_IP_WHITELIST is not set. Using the provider's published address list.");
            AddressAllowList::yookassa_default()
        },
    };
    if list.is_empty() {
        warn!(
            "🚨️ The payment notification whitelist is empty. The server will run, but won't accept any payment \
             notifications."
        );
    } else {
        info!("🪛️ Payment notification whitelist: {list}");
    }
    list
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The HMAC secret used to sign and verify access tokens.
    pub jwt_secret: Secret<String>,
    /// How long newly issued access tokens are valid for.
    pub token_validity: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        warn!(
            "🚨️🚨️🚨️ The JWT secret has not been set. I'm using a random value for this session. DO NOT operate on \
             production like this since every access token will be invalidated on restart. 🚨️🚨️🚨️"
        );
        let secret = thread_rng().sample_iter(&Alphanumeric).take(48).map(char::from).collect::<String>();
        match NamedTempFile::new().ok().and_then(|f| f.keep().ok()) {
            Some((mut f, p)) => {
                let key_data = json!({ "jwt_secret": secret }).to_string();
                match writeln!(f, "{key_data}") {
                    Ok(()) => warn!(
                        "🚨️🚨️🚨️ The JWT secret for this session was written to {}. If this is a production \
                         instance, you are doing it wrong! Set the SHOP_JWT_SECRET environment variable instead. \
                         🚨️🚨️🚨️",
                        p.to_str().unwrap_or("???")
                    ),
                    Err(e) => warn!("🪛️ Could not write the JWT secret to the temporary file. {e}"),
                }
            },
            None => {
                warn!("🪛️ Could not create a temporary file to store the JWT secret.");
            },
        }
        Self { jwt_secret: Secret::new(secret), token_validity: DEFAULT_TOKEN_VALIDITY }
    }
}

impl AuthConfig {
    pub fn new(secret: &str) -> Self {
        Self { jwt_secret: Secret::new(secret.to_string()), token_validity: DEFAULT_TOKEN_VALIDITY }
    }

    pub fn try_from_env() -> Result<Self, ServerError> {
        let secret =
            env::var("SHOP_JWT_SECRET").map_err(|e| ServerError::ConfigurationError(format!("{e} [SHOP_JWT_SECRET]")))?;
        if secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(ServerError::ConfigurationError(format!(
                "SHOP_JWT_SECRET must be at least {MIN_JWT_SECRET_LENGTH} characters long"
            )));
        }
        Ok(Self::new(&secret))
    }
}

//-------------------------------------------------  ServerOptions  ----------------------------------------------------
/// A subset of the server configuration that is used to configure the server's behaviour. Generally we try to keep this
/// as small as possible, and exclude secrets to avoid passing sensitive information around the system.
#[derive(Clone, Copy, Debug, Default)]
pub struct ServerOptions {
    pub use_x_forwarded_for: bool,
    pub use_forwarded: bool,
    /// Upper bound on the whole payment initiation call, on top of the HTTP client's own timeout.
    pub payment_timeout: StdDuration,
}

impl ServerOptions {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            use_x_forwarded_for: config.use_x_forwarded_for,
            use_forwarded: config.use_forwarded,
            payment_timeout: config.yookassa.timeout,
        }
    }
}
