mod logo;
pub use logo::LogoKind;
