pub mod otp;
pub mod session;
pub mod token;
