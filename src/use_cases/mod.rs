pub mod callback;

#[cfg(test)]
pub(crate) mod test_support;
