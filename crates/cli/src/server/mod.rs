mod dns;

pub use dns::serve;
