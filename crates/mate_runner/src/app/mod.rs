mod bootstrap;
mod loop_runner;

pub(crate) use bootstrap::{config_from_env, init_tracing, usage_text, Invocation};
pub(crate) use loop_runner::run;
