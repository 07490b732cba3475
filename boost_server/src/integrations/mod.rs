mod plisio;

pub use plisio::PlisioGateway;
