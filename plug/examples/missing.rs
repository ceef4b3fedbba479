use fibre_plug::{global, resolve, Contract, Error};
use std::panic;

trait Unregistered: Send + Sync {}
impl Contract for dyn Unregistered {}

fn main() {
  // --- Using the panicking `resolve!` macro ---
  println!("Attempting to resolve a contract that was never registered...");

  let result = panic::catch_unwind(|| {
    // This line will panic!
    let _service = resolve!(dyn Unregistered);
  });

  assert!(result.is_err(), "resolve! should have panicked.");
  println!("Successfully caught the expected panic from resolve!.");

  // --- Using the fallible `resolve()` method ---
  println!("\nNow, attempting to resolve using the fallible `resolve()` method...");

  match global().resolve::<dyn Unregistered>() {
    Ok(_) => panic!("Should not have found the contract!"),
    Err(err @ Error::NotRegistered { .. }) => println!("Correctly received an error: {}", err),
    Err(err) => panic!("Unexpected error: {}", err),
  }
}
