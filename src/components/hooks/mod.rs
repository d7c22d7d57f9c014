pub mod use_composed;
pub mod use_random;

pub use use_composed::*;
pub use use_random::*;
