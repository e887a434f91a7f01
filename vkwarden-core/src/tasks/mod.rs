pub mod reconcile_ticker;

pub use reconcile_ticker::spawn_reconcile_ticker;
