use std::future::Future;

use rtmp_formats::{
    commands::{CloseStreamCommand, ConnectCommand, CreateStreamCommand, DeleteStreamCommand, PublishCommand},
    data::MetaData,
    message::{AudioMessage, RtmpMessageBody, VideoMessage},
};

use crate::errors::RtmpServerError;

/// Per-session application surface. The session drives the protocol itself
/// (handshake replies, connect/createStream/publish responses,
/// acknowledgements); implementations override the hooks they care about,
/// typically just the media ones. The handler instance doubles as the
/// session's application state and is released through `cleanup`.
pub trait SessionHandler: Send {
    fn on_handshake(&mut self) -> impl Future<Output = ()> + Send {
        async {}
    }

    fn on_nc_connect(&mut self, command: &ConnectCommand) -> impl Future<Output = ()> + Send {
        async move {
            let _ = command;
        }
    }

    fn on_window_acknowledgement_size(&mut self, size: u32) -> impl Future<Output = ()> + Send {
        async move {
            let _ = size;
        }
    }

    fn on_nc_create_stream(
        &mut self,
        command: &CreateStreamCommand,
    ) -> impl Future<Output = ()> + Send {
        async move {
            let _ = command;
        }
    }

    fn on_ns_publish(&mut self, command: &PublishCommand) -> impl Future<Output = ()> + Send {
        async move {
            let _ = command;
        }
    }

    fn on_metadata(&mut self, metadata: &MetaData) -> impl Future<Output = ()> + Send {
        async move {
            let _ = metadata;
        }
    }

    fn on_set_chunk_size(&mut self, chunk_size: u32) -> impl Future<Output = ()> + Send {
        async move {
            let _ = chunk_size;
        }
    }

    fn on_video_message(
        &mut self,
        message: &VideoMessage,
        timestamp: u32,
    ) -> impl Future<Output = ()> + Send {
        async move {
            let _ = (message, timestamp);
        }
    }

    fn on_audio_message(
        &mut self,
        message: &AudioMessage,
        timestamp: u32,
    ) -> impl Future<Output = ()> + Send {
        async move {
            let _ = (message, timestamp);
        }
    }

    fn on_ns_close_stream(
        &mut self,
        command: &CloseStreamCommand,
    ) -> impl Future<Output = ()> + Send {
        async move {
            let _ = command;
        }
    }

    fn on_ns_delete_stream(
        &mut self,
        command: &DeleteStreamCommand,
    ) -> impl Future<Output = ()> + Send {
        async move {
            let _ = command;
        }
    }

    fn on_unknown_message(&mut self, message: &RtmpMessageBody) -> impl Future<Output = ()> + Send {
        async move {
            let _ = message;
        }
    }

    fn on_stream_closed(&mut self, error: &RtmpServerError) -> impl Future<Output = ()> + Send {
        async move {
            let _ = error;
        }
    }

    fn cleanup(&mut self) -> impl Future<Output = ()> + Send {
        async {}
    }
}

/// All-defaults handler, enough to satisfy a publisher end to end.
#[derive(Debug, Default)]
pub struct DefaultSessionHandler;

impl SessionHandler for DefaultSessionHandler {}
