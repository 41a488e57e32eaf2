pub mod ridership_source;
