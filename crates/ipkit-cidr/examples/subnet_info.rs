//! Subnet inspection example
//!
//! Run with: cargo run --example subnet_info

use ipkit_cidr::IpHandle;
use ipkit_core::codec::Format;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("ipkit - Subnet Info Example\n");

    let ip = IpHandle::parse("192.168.1.10/24")?;

    println!("Address: {}", ip);
    println!("─────────────────────────────");
    println!("Netmask:    {}", ip.net_mask(Format::Comp)?);
    println!("Network:    {}", ip.net_address(Format::Comp)?);
    println!("Broadcast:  {}", ip.broadcast(Format::Comp)?);
    println!("Hosts:      {}", ip.hosts()?);
    if let Some(gateway) = ip.default_gateway(Format::Comp)? {
        println!("Gateway:    {}", gateway);
    }

    println!("\nOther formats:");
    println!("  HEX: {}", ip.format_str("HEX")?);
    println!("  DEC: {}", ip.format_str("DEC")?);
    println!("  BIN: {}", ip.format_str("BIN")?);

    println!("\nMinimal subnet covering two hosts:");
    let a = IpHandle::parse("192.168.0.1")?;
    let b = IpHandle::parse("192.168.0.200")?;
    println!("  {} + {} -> {}", a, b, a.min_subnet_with(&b)?);

    println!("\nRange intersection:");
    let wide = IpHandle::parse("10.0.0.0/8")?;
    let narrow = IpHandle::parse("10.1.0.0/16")?;
    match wide.intersect_with(&narrow)? {
        Some(range) => println!("  {} ∩ {} = {}", wide, narrow, range),
        None => println!("  {} ∩ {} = (empty)", wide, narrow),
    }

    Ok(())
}
