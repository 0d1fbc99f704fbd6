fn main() {
    // The firmware embeds this file with `include_str!`.
    println!("cargo:rerun-if-changed=config/alarm.json");

    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
