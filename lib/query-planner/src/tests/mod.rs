mod dependencies;
mod fragments;
mod mutations;
mod split;
pub(crate) mod testkit;
