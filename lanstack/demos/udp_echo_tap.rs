//! Echoes UDP datagrams and answers pings on a tap interface.
//!
//! # Usage
//!
//! The demo opens a tap as its network device, announces its address and then sends every UDP
//! datagram it receives on the configured port back to where it came from.
//!
//! The following steps are necessary to set it up (likely requires root or sudo):
//!
//! 1. Setup the tap interface, named `tap0` here:
//!
//!   > $ ip tuntap add mode tap name tap0
//! 2. Assign an address on the host system
//!
//!   > $ ip addr add 192.168.56.1/24 dev tap0
//! 3. Bring up the interface on the host
//!
//!   > $ ip link set up dev tap0
//! 4. Start the demo.
//!
//!   > $ cargo run --example udp_echo_tap -- tap0 --ip 192.168.56.2
//! 5. Talk to it from the host.
//!
//!   > $ ping -c 3 192.168.56.2
//!
//!   > $ nc -u 192.168.56.2 7
use std::io::{stdout, Write};
use std::os::unix::io::AsRawFd;
use std::time::Duration;
use structopt::StructOpt;

use lanstack::layer::{udp, FnHandler};
use lanstack::nic::sys::{self, TapInterface};
use lanstack::wire::{EthernetAddress, Ipv4Address};
use lanstack::{Config, Stack};

fn main() {
    let Options {
        name,
        ip,
        mac,
        mtu,
        port,
    } = Options::from_args();

    let mut interface = TapInterface::new(&name)
        .expect("Couldn't initialize interface");

    let mut config = Config::new(ip, mac);
    config.mtu = match mtu {
        Some(mtu) => mtu,
        None => interface.interface_mtu().unwrap_or(config.mtu),
    };

    let fd = interface.as_raw_fd();
    let mut stack = Stack::new(interface, &config);

    let echo = FnHandler(|packet: udp::Packet<'_>, sender: &mut dyn udp::Sender| {
        if let Err(err) = sender.send_to(packet.payload, packet.dst_port, packet.src_addr, packet.src_port) {
            eprintln!("Failed to echo to {}:{}: {}", packet.src_addr, packet.src_port, err);
        }
    });
    stack.udp_open(port, echo).expect("Couldn't open port");
    stack.announce().expect("Couldn't announce address");

    let out = stdout();
    let mut out = out.lock();
    writeln!(out, "Echoing on {}:{}", config.ip_addr, port).unwrap();

    let mut known = 0;
    loop {
        match stack.poll() {
            Ok(true) => continue,
            Ok(false) => (),
            Err(err) => panic!("Error during receive {} {:?}", err, stack.device_mut().last_err()),
        }

        let now = stack.now();
        let neighbors = stack.arp().neighbors(now).count();
        if neighbors != known {
            known = neighbors;
            for neighbor in stack.arp().neighbors(now) {
                writeln!(out, "{} is at {}", neighbor.protocol_addr, neighbor.hardware_addr).unwrap();
            }
        }

        sys::wait(fd, Some(Duration::from_secs(1))).expect("Couldn't wait for the interface");
    }
}

#[derive(StructOpt)]
#[structopt(name = "udp_echo_tap")]
struct Options {
    /// Name of the tap interface.
    name: String,

    /// Our IPv4 address.
    #[structopt(long = "ip", default_value = "192.168.56.2")]
    ip: Ipv4Address,

    /// Our hardware address.
    #[structopt(long = "mac", default_value = "00:11:22:33:44:55")]
    mac: EthernetAddress,

    /// Override the MTU of the interface.
    #[structopt(long = "mtu")]
    mtu: Option<usize>,

    /// The port to echo on.
    #[structopt(long = "port", default_value = "7")]
    port: u16,
}
