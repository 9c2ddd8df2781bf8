pub mod alias;
pub mod fee;
pub mod lead_time;
pub mod normalize;
pub mod orchestrator;
pub mod resolver;
pub mod tables;

#[cfg(test)]
pub(crate) mod test_support;
