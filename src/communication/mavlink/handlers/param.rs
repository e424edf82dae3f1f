//! MAVLink Parameter Protocol Handler
//!
//! # Supported Messages
//!
//! - **PARAM_REQUEST_LIST**: Start streaming every float-castable parameter
//! - **PARAM_REQUEST_READ**: Send one parameter by index or name
//! - **PARAM_SET**: Convert, store and persist a value, then echo what was stored
//!
//! Streaming is rate-limited by the caller: each [`ParamHandler::next_value`]
//! call yields at most one PARAM_VALUE. Text parameters have no float value
//! and are skipped without consuming a protocol index.

use super::super::{name_to_param_id, param_id_to_name};
use apo_core::parameters::{
    ParamPersistence, ParamType, ParamValue, ParameterError, ParameterStore,
};
use mavlink::common::{
    MavMessage, MavParamType, PARAM_REQUEST_READ_DATA, PARAM_SET_DATA, PARAM_VALUE_DATA,
};

/// Parameter protocol handler
#[derive(Debug, Default)]
pub struct ParamHandler {
    /// Protocol index of the next parameter to stream
    cursor: Option<u16>,
}

impl ParamHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a PARAM_REQUEST_LIST stream is in progress
    pub fn is_streaming(&self) -> bool {
        self.cursor.is_some()
    }

    /// Handle PARAM_REQUEST_LIST: restart the stream at the first parameter
    pub fn handle_request_list(&mut self) {
        crate::log_info!("Parameter list requested");
        self.cursor = Some(0);
    }

    /// Next PARAM_VALUE of an active stream
    pub fn next_value(&mut self, params: &ParameterStore) -> Option<MavMessage> {
        let index = self.cursor?;
        match params.streamable(index) {
            Some((name, value)) => {
                self.cursor = Some(index + 1);
                Some(param_value(name, value, index, params.streamable_count()))
            }
            None => {
                crate::log_debug!("Parameter stream complete ({} sent)", index);
                self.cursor = None;
                None
            }
        }
    }

    /// Handle PARAM_REQUEST_READ
    pub fn handle_request_read(
        &self,
        data: &PARAM_REQUEST_READ_DATA,
        params: &ParameterStore,
    ) -> Option<MavMessage> {
        let count = params.streamable_count();
        if data.param_index >= 0 {
            let index = data.param_index as u16;
            let (name, value) = params.streamable(index)?;
            return Some(param_value(name, value, index, count));
        }

        let name = param_id_to_name(&data.param_id)?;
        let index = params.index_of(name)?;
        let value = params.get(name)?;
        Some(param_value(name, value, index, count))
    }

    /// Handle PARAM_SET.
    ///
    /// Rejected silently (no reply) for unknown names, non-finite values,
    /// text or read-only parameters. On success the stored value is echoed,
    /// which may differ from the request after integer truncation.
    pub fn handle_set(
        &self,
        data: &PARAM_SET_DATA,
        params: &mut ParameterStore,
        storage: &mut dyn ParamPersistence,
    ) -> Option<MavMessage> {
        let name = param_id_to_name(&data.param_id)?;
        if !data.param_value.is_finite() {
            crate::log_warn!("PARAM_SET {} rejected: value not finite", name);
            return None;
        }

        match params.set_and_save(name, data.param_value, storage) {
            Ok(_) => {}
            Err(ParameterError::Storage) => {
                crate::log_warn!("PARAM_SET {} stored but not persisted", name);
            }
            Err(e) => {
                crate::log_warn!("PARAM_SET {} rejected: {}", name, e);
                return None;
            }
        }

        let index = params.index_of(name)?;
        let value = params.get(name)?;
        Some(param_value(name, value, index, params.streamable_count()))
    }
}

fn mav_param_type(ty: ParamType) -> MavParamType {
    match ty {
        ParamType::Int32 => MavParamType::MAV_PARAM_TYPE_INT32,
        ParamType::Int16 => MavParamType::MAV_PARAM_TYPE_INT16,
        ParamType::Int8 => MavParamType::MAV_PARAM_TYPE_INT8,
        ParamType::Float | ParamType::Float16 | ParamType::Text => {
            MavParamType::MAV_PARAM_TYPE_REAL32
        }
    }
}

fn param_value(name: &str, value: &ParamValue, index: u16, count: u16) -> MavMessage {
    MavMessage::PARAM_VALUE(PARAM_VALUE_DATA {
        param_value: value.cast_to_float(),
        param_count: count,
        param_index: index,
        param_id: name_to_param_id(name),
        param_type: mav_param_type(value.param_type()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::MemoryStorage;
    use apo_core::parameters::ParamFlags;

    fn store() -> ParameterStore {
        let mut store = ParameterStore::new();
        store
            .register("WP_RADIUS", 10, ParamValue::Float(2.0), ParamFlags::empty())
            .unwrap();
        store
            .register("NOTE", 90, ParamValue::Text("rover".try_into().unwrap()), ParamFlags::empty())
            .unwrap();
        store
            .register("CNTRL_MODE", 20, ParamValue::Int8(0), ParamFlags::empty())
            .unwrap();
        store
            .register("CMD_TOTAL", 2, ParamValue::Int16(0), ParamFlags::READ_ONLY)
            .unwrap();
        store
    }

    fn set(name: &str, value: f32) -> PARAM_SET_DATA {
        PARAM_SET_DATA {
            param_value: value,
            target_system: 1,
            target_component: 1,
            param_id: name_to_param_id(name),
            param_type: MavParamType::MAV_PARAM_TYPE_REAL32,
        }
    }

    fn unpack(msg: MavMessage) -> PARAM_VALUE_DATA {
        match msg {
            MavMessage::PARAM_VALUE(data) => data,
            other => panic!("unexpected message {other:?}"),
        }
    }

    #[test]
    fn test_stream_skips_text_without_consuming_index() {
        let params = store();
        let mut handler = ParamHandler::new();
        assert!(handler.next_value(&params).is_none());

        handler.handle_request_list();
        let first = unpack(handler.next_value(&params).unwrap());
        let second = unpack(handler.next_value(&params).unwrap());
        let third = unpack(handler.next_value(&params).unwrap());
        assert!(handler.next_value(&params).is_none());
        assert!(!handler.is_streaming());

        assert_eq!(param_id_to_name(&first.param_id), Some("WP_RADIUS"));
        assert_eq!(param_id_to_name(&second.param_id), Some("CNTRL_MODE"));
        assert_eq!(second.param_index, 1);
        assert_eq!(third.param_index, 2);
        assert_eq!(third.param_count, 3);
    }

    #[test]
    fn test_set_int8_truncates_after_bias() {
        let mut params = store();
        let mut storage = MemoryStorage::new();
        let handler = ParamHandler::new();

        let echo = unpack(
            handler
                .handle_set(&set("CNTRL_MODE", 4.6), &mut params, &mut storage)
                .unwrap(),
        );
        assert_eq!(echo.param_value, 4.0);
        assert_eq!(echo.param_index, 1);
        assert_eq!(echo.param_type, MavParamType::MAV_PARAM_TYPE_INT8);
        assert_eq!(params.get("CNTRL_MODE"), Some(&ParamValue::Int8(4)));
        assert_eq!(storage.record(20), Some(&ParamValue::Int8(4)));
    }

    #[test]
    fn test_set_rejections_send_nothing() {
        let mut params = store();
        let mut storage = MemoryStorage::new();
        let handler = ParamHandler::new();
        let generation = params.generation();

        for request in [
            set("NO_SUCH", 1.0),
            set("WP_RADIUS", f32::NAN),
            set("WP_RADIUS", f32::INFINITY),
            set("NOTE", 1.0),
            set("CMD_TOTAL", 3.0),
        ] {
            assert!(handler
                .handle_set(&request, &mut params, &mut storage)
                .is_none());
        }
        assert_eq!(params.generation(), generation);
        assert_eq!(storage.write_count(), 0);
    }

    #[test]
    fn test_set_echoes_when_persistence_fails() {
        let mut params = store();
        let mut storage = MemoryStorage::new();
        storage.set_fail_writes(true);
        let handler = ParamHandler::new();
        let echo = handler.handle_set(&set("WP_RADIUS", 3.5), &mut params, &mut storage);
        assert_eq!(unpack(echo.unwrap()).param_value, 3.5);
    }

    #[test]
    fn test_request_read_by_index_and_name() {
        let params = store();
        let handler = ParamHandler::new();

        let by_index = handler
            .handle_request_read(
                &PARAM_REQUEST_READ_DATA {
                    param_index: 2,
                    target_system: 1,
                    target_component: 1,
                    param_id: [0; 16],
                },
                &params,
            )
            .map(unpack)
            .unwrap();
        assert_eq!(param_id_to_name(&by_index.param_id), Some("CMD_TOTAL"));

        let by_name = handler
            .handle_request_read(
                &PARAM_REQUEST_READ_DATA {
                    param_index: -1,
                    target_system: 1,
                    target_component: 1,
                    param_id: name_to_param_id("WP_RADIUS"),
                },
                &params,
            )
            .map(unpack)
            .unwrap();
        assert_eq!(by_name.param_index, 0);
        assert_eq!(by_name.param_value, 2.0);
    }

    #[test]
    fn test_request_read_text_by_name_sends_nothing() {
        let params = store();
        let handler = ParamHandler::new();
        let reply = handler.handle_request_read(
            &PARAM_REQUEST_READ_DATA {
                param_index: -1,
                target_system: 1,
                target_component: 1,
                param_id: name_to_param_id("NOTE"),
            },
            &params,
        );
        assert!(reply.is_none());
        assert!(params.get("NOTE").is_some());
    }
}
