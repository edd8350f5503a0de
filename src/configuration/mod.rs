pub use self::configuration::*;

mod configuration;
