fn main() {
  if let Err(e) = mileage_log_lib::run() {
    eprintln!("mileage-log: {}", e);
    std::process::exit(1);
  }
}
