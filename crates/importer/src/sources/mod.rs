pub mod timing_api;
