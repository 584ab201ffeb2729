pub mod timing_result;
