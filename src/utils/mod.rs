mod string_encoding;

pub(crate) use string_encoding::*;
