//! One simulated banking day at a two-ATM facility, narrated to stdout.
//!
//! Customers arrive at a mean rate of 40 per hour over nine hours and need
//! 2.4 minutes at a machine on average, with a fairly spread-out log-normal
//! service time. At most six customers will wait in line; anyone arriving to
//! a full line walks away.
//!
//! All printing happens in an [`Observer`] implementation; the core emits
//! notifications and never touches stdout itself. Run with a seed argument to
//! replay a specific day, or without one for a fresh day from OS entropy.

use atmsim::{Customer, Observer, SimConfig, Simulation, Timeslice};

struct StdoutLog;

impl Observer for StdoutLog {
    fn on_arrival(&mut self, now: f64, customer: &Customer) {
        println!("[{now:8.3}] customer {} arrives", customer.id);
    }

    fn on_balk(&mut self, now: f64, customer: &Customer) {
        println!("[{now:8.3}] customer {} sees a full line and leaves", customer.id);
    }

    fn on_service_start(
        &mut self,
        now: f64,
        atm_id: usize,
        customer: &Customer,
        wait_min: f64,
        service_min: f64,
    ) {
        println!(
            "[{now:8.3}] customer {} starts at ATM {atm_id} after waiting {wait_min:.3} min ({service_min:.3} min of service ahead)",
            customer.id,
        );
    }

    fn on_departure(&mut self, now: f64, atm_id: usize, customer_id: u64) {
        println!("[{now:8.3}] customer {customer_id} leaves ATM {atm_id}");
    }

    fn on_timeslice(&mut self, slice: &Timeslice) {
        println!(
            "[{:8.3}] -- {} waiting, {} in service, {} done, {} balked --",
            slice.now, slice.queue_len, slice.in_service, slice.completed, slice.balked,
        );
    }
}

fn main() {
    let seed = std::env::args().nth(1).and_then(|arg| arg.parse().ok());

    let config = SimConfig {
        atms: 2,
        horizon_min: 540.0,
        arrival_rate_per_hour: 40.0,
        service_mean_min: 2.4,
        service_cv: 0.9,
        max_queue: Some(6),
        seed,
        timeslice_dt_min: Some(30.0),
    };

    let mut sim = Simulation::new(config).expect("demo configuration is valid");
    let summary = sim.run_with(&mut StdoutLog).expect("run completes to the horizon");

    println!();
    println!("=== day summary ===");
    println!("arrivals:        {}", summary.arrivals);
    println!("balked:          {}", summary.balked);
    println!("served:          {}", summary.completed);
    println!("avg wait:        {:.3} min", summary.avg_wait_min);
    println!("p95 wait:        {:.3} min", summary.p95_wait_min);
    println!("avg line length: {:.3}", summary.avg_queue_len);
    for (atm_id, utilization) in summary.utilization.iter().enumerate() {
        println!("ATM {atm_id} busy:      {:.1}%", 100.0 * utilization);
    }
}
