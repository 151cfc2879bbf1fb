pub(crate) mod bootstrap;
pub(crate) mod editing;
pub(crate) mod loop_runner;
pub(crate) mod tiles;
