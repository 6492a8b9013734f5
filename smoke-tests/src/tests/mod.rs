mod smoke_concurrency;
mod smoke_config;
mod smoke_linear_model;
