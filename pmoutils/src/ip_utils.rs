use std::net::UdpSocket;

/// Devine l'adresse IP locale de la machine.
///
/// Crée un socket UDP et le "connecte" vers un serveur DNS public (8.8.8.8) :
/// aucun paquet n'est émis, mais le système choisit l'interface qui serait
/// utilisée, ce qui donne l'adresse à annoncer aux enceintes du réseau local.
///
/// # Returns
///
/// L'adresse IP locale sous forme de `String`, ou `"127.0.0.1"` en cas d'échec.
pub fn guess_local_ip() -> String {
    match UdpSocket::bind("0.0.0.0:0") {
        Ok(socket) => {
            if socket.connect("8.8.8.8:80").is_ok() {
                if let Ok(local_addr) = socket.local_addr() {
                    return local_addr.ip().to_string();
                }
            }
            "127.0.0.1".to_string()
        }
        Err(_) => "127.0.0.1".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::IpAddr;

    #[test]
    fn test_guess_local_ip_returns_valid_ip() {
        let ip = guess_local_ip();
        assert!(ip.parse::<IpAddr>().is_ok(), "Should return a valid IP address");
    }

    #[test]
    fn test_guess_local_ip_is_ipv4() {
        let ip = guess_local_ip();

        if let Ok(parsed_ip) = ip.parse::<IpAddr>() {
            assert!(parsed_ip.is_ipv4(), "Should return an IPv4 address");
        }
    }
}
