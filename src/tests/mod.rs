pub(crate) mod fixtures;

mod patch;
