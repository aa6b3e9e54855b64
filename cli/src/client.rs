use reqwest::{
    blocking::{Client, RequestBuilder},
    StatusCode,
};
use serde::de::DeserializeOwned;
use shuffle_core::types::{
    Artist, ArtistId, ArtistInput, Changes, Created, Credentials, ErrorBody, Song, SongId,
    SongInput, Success,
};
use thiserror::Error;
use tracing::debug;

pub struct ShuffleClient {
    address: String,
    client: Client,
}

impl ShuffleClient {
    pub fn new(address: &str) -> Result<ShuffleClient, ServiceError> {
        let client = Client::builder().cookie_store(true).build()?;
        Ok(ShuffleClient {
            address: address.to_owned(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.address, path)
    }

    fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ServiceError> {
        let res = request.send()?;
        let status = res.status();
        debug!("{} {}", res.url(), status);

        if !status.is_success() {
            let message = res
                .json::<ErrorBody>()
                .map(|body| body.error)
                .unwrap_or_else(|_| status.to_string());
            return Err(ServiceError::Rejected { status, message });
        }

        Ok(res.json()?)
    }

    pub fn login(&self, username: &str, password: &str) -> Result<(), ServiceError> {
        let credentials = Credentials {
            username: username.to_owned(),
            password: password.to_owned(),
        };
        let _: Success = self.send(self.client.post(self.url("/login")).json(&credentials))?;
        Ok(())
    }

    pub fn songs(&self) -> Result<Vec<Song>, ServiceError> {
        self.send(self.client.get(self.url("/api/songs")))
    }

    pub fn artists(&self) -> Result<Vec<Artist>, ServiceError> {
        self.send(self.client.get(self.url("/api/artists")))
    }

    pub fn create_artist(&self, artist: &ArtistInput) -> Result<Created, ServiceError> {
        self.send(self.client.post(self.url("/api/artists")).json(artist))
    }

    pub fn update_artist(&self, id: ArtistId, artist: &ArtistInput) -> Result<Changes, ServiceError> {
        self.send(
            self.client
                .put(self.url(&format!("/api/artists/{id}")))
                .json(artist),
        )
    }

    pub fn delete_artist(&self, id: ArtistId) -> Result<Changes, ServiceError> {
        self.send(self.client.delete(self.url(&format!("/api/artists/{id}"))))
    }

    pub fn create_song(&self, song: &SongInput) -> Result<Created, ServiceError> {
        self.send(self.client.post(self.url("/api/songs")).json(song))
    }

    pub fn update_song(&self, id: SongId, song: &SongInput) -> Result<Changes, ServiceError> {
        self.send(self.client.put(self.url(&format!("/api/songs/{id}"))).json(song))
    }

    pub fn delete_song(&self, id: SongId) -> Result<Changes, ServiceError> {
        self.send(self.client.delete(self.url(&format!("/api/songs/{id}"))))
    }
}

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("error using shuffle service backend: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("server rejected the request ({status}): {message}")]
    Rejected { status: StatusCode, message: String },
}
