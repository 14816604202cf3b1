//! Mandatory-field and value-range checks on an inbound `CreateSession`.

use crate::error::ErrorInfo;
use crate::session::types::{
    AsId, CreateSession, PortsSpec, QosProfile, SessionRequest, UeId,
    DEFAULT_SESSION_DURATION_SECS,
};
use log::{error, warn};
use std::net::Ipv4Addr;

const MAX_PORT: i32 = 65_535;

/// Validate a session request and produce its typed form.
///
/// The original body is carried through untouched; unsupported identity
/// fields are logged and otherwise ignored.
pub fn validate_session_request(request: CreateSession) -> Result<SessionRequest, ErrorInfo> {
    let ue_addr = validate_ue_id(&request.ue_id)?;
    let as_addr = validate_as_id(&request.as_id)?;
    let qos = validate_qos(&request.qos)?;
    validate_ports("uePorts", request.ue_ports.as_ref())?;
    validate_ports("asPorts", request.as_ports.as_ref())?;
    let duration = validate_duration(request.duration)?;

    Ok(SessionRequest {
        ue_addr,
        as_addr,
        qos,
        duration,
        original: request,
    })
}

fn validate_ue_id(ue_id: &UeId) -> Result<Ipv4Addr, ErrorInfo> {
    if let Some(ipv6addr) = &ue_id.ipv6addr {
        warn!("ueId: ipv6addr processing unsupported. ipv6addr {}", ipv6addr);
    }
    if let Some(external_id) = &ue_id.external_id {
        warn!("ueId: externalId processing unsupported. externalId {}", external_id);
    }
    if let Some(msisdn) = &ue_id.msisdn {
        warn!("ueId: msisdn processing unsupported. msisdn {}", msisdn);
    }
    parse_ipv4("ueId", ue_id.ipv4addr.as_deref())
}

fn validate_as_id(as_id: &AsId) -> Result<Ipv4Addr, ErrorInfo> {
    if let Some(ipv6addr) = &as_id.ipv6addr {
        warn!("asId: ipv6addr processing unsupported. ipv6addr {}", ipv6addr);
    }
    parse_ipv4("asId", as_id.ipv4addr.as_deref())
}

fn parse_ipv4(field: &str, value: Option<&str>) -> Result<Ipv4Addr, ErrorInfo> {
    let raw = value.ok_or_else(|| {
        error!("{} did not have mandatory ipv4addr property", field);
        ErrorInfo::invalid_input(format!("{} did not have mandatory ipv4addr property", field))
    })?;
    raw.parse::<Ipv4Addr>().map_err(|_| {
        error!("{}: ipv4addr {} not valid", field, raw);
        ErrorInfo::invalid_input(format!("{} ipv4addr {} not valid", field, raw))
    })
}

fn validate_qos(qos: &str) -> Result<QosProfile, ErrorInfo> {
    qos.parse::<QosProfile>().map_err(|message| {
        error!("qos: {}", message);
        ErrorInfo::invalid_input(message)
    })
}

fn is_valid_port(port: i32) -> bool {
    (0..=MAX_PORT).contains(&port)
}

/// Checks every port and range of a port specification.
pub fn validate_ports(field: &str, ports: Option<&PortsSpec>) -> Result<(), ErrorInfo> {
    let Some(ports) = ports else {
        return Ok(());
    };

    for port in ports.ports.iter().flatten() {
        if !is_valid_port(*port) {
            error!("{}: port {} not valid", field, port);
            return Err(ErrorInfo::invalid_input(format!(
                "{}: port {} not valid",
                field, port
            )));
        }
    }

    for range in ports.ranges.iter().flatten() {
        if !is_valid_port(range.from) {
            error!("{}: port range from {} not valid", field, range.from);
            return Err(ErrorInfo::invalid_input(format!(
                "{}: port range from {} not valid",
                field, range.from
            )));
        }
        if !is_valid_port(range.to) {
            error!("{}: port range to {} not valid", field, range.to);
            return Err(ErrorInfo::invalid_input(format!(
                "{}: port range to {} not valid",
                field, range.to
            )));
        }
        if range.from > range.to {
            error!(
                "{}: port range from {} to {} not valid",
                field, range.from, range.to
            );
            return Err(ErrorInfo::invalid_input(format!(
                "{}: port range from {} to {} not valid",
                field, range.from, range.to
            )));
        }
    }

    Ok(())
}

fn validate_duration(duration: Option<i32>) -> Result<i32, ErrorInfo> {
    match duration {
        None => Ok(DEFAULT_SESSION_DURATION_SECS),
        Some(secs) if secs >= 1 => Ok(secs),
        Some(secs) => {
            error!("duration {} not valid", secs);
            Err(ErrorInfo::invalid_input(format!(
                "duration {} not valid",
                secs
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::session::types::PortRange;

    fn base_request() -> CreateSession {
        CreateSession {
            ue_id: UeId {
                ipv4addr: Some("10.0.0.1".to_string()),
                ..Default::default()
            },
            as_id: AsId {
                ipv4addr: Some("10.10.1.100".to_string()),
                ..Default::default()
            },
            qos: "QOS_E".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_request() {
        let validated = validate_session_request(base_request()).unwrap();
        assert_eq!(validated.ue_addr, Ipv4Addr::new(10, 0, 0, 1));
        assert_eq!(validated.as_addr, Ipv4Addr::new(10, 10, 1, 100));
        assert_eq!(validated.qos, QosProfile::E);
        assert_eq!(validated.duration, DEFAULT_SESSION_DURATION_SECS);
    }

    #[test]
    fn test_missing_as_address() {
        let mut request = base_request();
        request.as_id.ipv4addr = None;
        let err = validate_session_request(request).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
        assert!(err.message.contains("asId"));
    }

    #[test]
    fn test_missing_ue_address() {
        let mut request = base_request();
        request.ue_id.ipv4addr = None;
        let err = validate_session_request(request).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
        assert!(err.message.contains("ueId"));
    }

    #[test]
    fn test_malformed_address() {
        let mut request = base_request();
        request.ue_id.ipv4addr = Some("10.0.0.256".to_string());
        let err = validate_session_request(request).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
    }

    #[test]
    fn test_unknown_qos() {
        let mut request = base_request();
        request.qos = "QOS_XL".to_string();
        let err = validate_session_request(request).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
        assert!(err.message.contains("QOS_XL"));
    }

    #[test]
    fn test_port_out_of_range() {
        let mut request = base_request();
        request.ue_ports = Some(PortsSpec {
            ranges: None,
            ports: Some(vec![80, 65_536]),
        });
        let err = validate_session_request(request).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
        assert!(err.message.contains("65536"));
    }

    #[test]
    fn test_inverted_range() {
        let mut request = base_request();
        request.as_ports = Some(PortsSpec {
            ranges: Some(vec![PortRange { from: 9000, to: 8000 }]),
            ports: None,
        });
        let err = validate_session_request(request).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
        assert!(err.message.contains("9000"));
        assert!(err.message.contains("8000"));
    }

    #[test]
    fn test_range_bounds_inclusive() {
        let mut request = base_request();
        request.as_ports = Some(PortsSpec {
            ranges: Some(vec![PortRange { from: 0, to: 65_535 }]),
            ports: Some(vec![0, 65_535]),
        });
        assert!(validate_session_request(request).is_ok());
    }

    #[test]
    fn test_unsupported_fields_are_kept() {
        let mut request = base_request();
        request.ue_id.msisdn = Some("+123456789".to_string());
        request.ue_id.ipv6addr = Some("2001:db8::1".to_string());
        let validated = validate_session_request(request.clone()).unwrap();
        assert_eq!(validated.original, request);
    }

    #[test]
    fn test_duration() {
        let mut request = base_request();
        request.duration = Some(3600);
        assert_eq!(validate_session_request(request.clone()).unwrap().duration, 3600);

        request.duration = Some(0);
        let err = validate_session_request(request).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
    }
}
