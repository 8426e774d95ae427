mod abi;

pub(crate) use abi::*;
