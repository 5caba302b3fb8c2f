mod bitemporal_engine;

pub use bitemporal_engine::IBitemporalEngine;
