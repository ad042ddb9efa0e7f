pub mod lang_alt;
pub mod rational;
pub mod text_bag;
pub mod value;

pub use lang_alt::{LangAltMap, DEFAULT_LANG};
pub use rational::Rational;
pub use text_bag::TextBag;
pub use value::{Assign, Lookup, TagValue};
