pub mod captcha;
pub mod claims;
pub mod context;
pub mod middleware;
pub mod password;
pub mod session;

pub use captcha::{CaptchaError, CaptchaVerifier, PermissiveCaptcha, RecaptchaVerifier};
pub use claims::Claims;
pub use context::AuthContext;
pub use middleware::{RequireAdmin, RequireAuth};
pub use session::SessionKeys;
