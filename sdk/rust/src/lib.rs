//! Client for the raffle gateway's `/api/v1` surface.

pub mod client;

pub use client::{
    BuildTxResponse, ClientError, GatewayClient, ReleaseResponse, RetrievedImage, UploadResponse,
    VerifyResponse,
};
