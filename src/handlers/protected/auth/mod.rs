pub mod otp;
pub mod session;

pub use otp::{resend_otp, verify_otp};
pub use session::me;
