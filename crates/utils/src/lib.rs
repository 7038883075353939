pub mod header_util;
pub mod response;
