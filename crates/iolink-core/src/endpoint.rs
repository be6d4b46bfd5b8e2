//! Fixed REST paths exposed by the AL1350

/// Number of IO-Link ports on the master
pub const PORT_COUNT: &str = "/iolinkmaster/port/numberofports/getdata";

/// Status of the device connected to a port
pub fn status(port: u16) -> String {
    format!("/iolinkmaster/port[{}]/iolinkdevice/status/getdata", port)
}

/// Product name of the device connected to a port
pub fn product_name(port: u16) -> String {
    format!("/iolinkmaster/port[{}]/iolinkdevice/productname/getdata", port)
}

/// Raw process data (PDIN) of the device connected to a port
pub fn process_data(port: u16) -> String {
    format!("/iolinkmaster/port[{}]/iolinkdevice/pdin/getdata", port)
}

/// Join a device address and an endpoint path into a request URL
pub fn url(address: &str, path: &str) -> String {
    let address = address.trim_end_matches('/');
    let address = address
        .strip_prefix("http://")
        .unwrap_or(address);
    if path.starts_with('/') {
        format!("http://{}{}", address, path)
    } else {
        format!("http://{}/{}", address, path)
    }
}
