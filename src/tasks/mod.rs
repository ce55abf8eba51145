pub mod results_refresher;
