mod style;

pub use style::{accent, dim, header, message_line, success, typing_indicator, value, yellow};
