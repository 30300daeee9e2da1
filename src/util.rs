mod feed_ext;
pub mod parse;

// extension methods on foreign feed types
#[derive(Default)]
pub struct W<T>(pub T);
