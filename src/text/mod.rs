mod ustring;

pub use ustring::UString;
