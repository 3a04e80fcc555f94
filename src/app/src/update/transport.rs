use crux_core::Command;

use crate::api::{DeviceCall, Payload, Reply};
use crate::events::{Event, TransportEvent};
use crate::http_helpers::{build_url, process_body_response};
use crate::model::Model;
use crate::types::TransportError;
use crate::{Effect, HttpCmd};

use super::{bootstrap, credentials, monitor, settings, wlan};

/// Queues a device call; it is issued as soon as nothing else is in flight.
pub fn send(model: &mut Model, call: DeviceCall, reply: Reply) -> Command<Effect, Event> {
    log::debug!(
        "queue {} ({} waiting, in flight: {:?})",
        call.endpoint(),
        model.transport.queue.len(),
        model.transport.in_flight.as_ref().map(|f| f.endpoint)
    );
    model.transport.queue.push_back((call, reply));
    pump(model)
}

/// Issues the head of the queue if the device is idle
pub fn pump(model: &mut Model) -> Command<Effect, Event> {
    match model.transport.next_call() {
        Some((call, reply)) => issue(call, reply),
        None => Command::done(),
    }
}

fn issue(call: DeviceCall, reply: Reply) -> Command<Effect, Event> {
    let endpoint = call.endpoint();
    let url = build_url(endpoint);
    let request = if call.is_post() {
        HttpCmd::post(url)
    } else {
        HttpCmd::get(url)
    };

    let request = match call.into_payload() {
        Ok(Payload::None) => request,
        Ok(Payload::Json(body)) => request
            .header("Content-Type", "application/json")
            .body_string(body),
        Ok(Payload::Binary { file_name, bytes }) => request
            .header("Content-Type", "application/octet-stream")
            .header("X-File-Name", file_name.as_str())
            .body_bytes(bytes),
        Err(e) => {
            log::error!("failed to encode {endpoint} request: {e}");
            return Command::event(Event::Transport(TransportEvent::Completed {
                reply,
                result: Err(TransportError::network(format!(
                    "failed to create {endpoint} request: {e}"
                ))),
            }));
        }
    };

    log::debug!("issue {endpoint}");
    request.build().then_send(move |result| {
        Event::Transport(TransportEvent::Completed {
            reply,
            result: process_body_response(endpoint, result),
        })
    })
}

/// Routes a completion to its continuation, then issues the next queued call
pub fn handle(event: TransportEvent, model: &mut Model) -> Command<Effect, Event> {
    match event {
        TransportEvent::Completed { reply, result } => {
            match model.transport.complete() {
                Some(in_flight) if in_flight.reply != reply => {
                    log::warn!(
                        "completion for {reply:?} while {} was in flight",
                        in_flight.endpoint
                    )
                }
                None => log::warn!("completion for {reply:?} with nothing in flight"),
                _ => {}
            }
            if let Err(e) = &result {
                log::warn!("{reply:?} failed: {e}");
            }

            let continuation = route(reply, result, model);
            Command::all([continuation, pump(model)])
        }
    }
}

fn route(
    reply: Reply,
    result: Result<Vec<u8>, TransportError>,
    model: &mut Model,
) -> Command<Effect, Event> {
    match reply {
        Reply::Bootstrap(step) => bootstrap::handle_step_result(model, step, result),
        Reply::WifiList => wlan::handle_scan_list(model, result),
        Reply::WifiParam => wlan::handle_scan_param(model, result),
        Reply::WifiJoin { ssid } => wlan::handle_join_result(model, ssid, result),
        Reply::Region { country_code } => wlan::handle_region_result(model, country_code, result),
        Reply::CredentialUpload {
            slot,
            token,
            file_name,
        } => credentials::handle_upload_result(model, slot, token, file_name, result),
        Reply::CredentialDelete { slot } => credentials::handle_delete_result(model, slot, result),
        Reply::CredentialReconcile => credentials::handle_reconcile_result(model, result),
        Reply::MonitorPoll { generation } => monitor::handle_poll_result(model, generation, result),
        Reply::Settings(reply) => settings::handle_result(model, reply, result),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::SettingsReply;
    use crate::update::test_support::{in_flight, pending_endpoints, respond};

    #[test]
    fn calls_are_issued_one_at_a_time_in_order() {
        let mut model = Model::default();

        let _ = send(
            &mut model,
            DeviceCall::GetDevInfo,
            Reply::Settings(SettingsReply::CellularParam),
        );
        let _ = send(&mut model, DeviceCall::GetWifiList, Reply::WifiList);
        let _ = send(&mut model, DeviceCall::GetPlatformParam, Reply::CredentialReconcile);

        assert_eq!(model.transport.issued, 1);
        assert_eq!(
            pending_endpoints(&model),
            vec![
                "/system/getDevInfo",
                "/network/getWifiList",
                "/network/getPlatformParam"
            ]
        );

        respond(&mut model, "{}");
        assert_eq!(model.transport.issued, 2);
        assert_eq!(
            in_flight(&model).map(|(endpoint, _)| endpoint),
            Some("/network/getWifiList")
        );
    }

    #[test]
    fn idle_pump_does_nothing() {
        let mut model = Model::default();
        let _ = pump(&mut model);
        assert!(model.transport.is_idle());
        assert_eq!(model.transport.issued, 0);
    }
}
