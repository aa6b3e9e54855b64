// (Lines like the one below ignore selected Clippy rules
//  - it's useful when you want to check your code with `cargo make verify`
// but some rules are too "annoying" or are not applicable for your case.)
#![allow(clippy::wildcard_imports)]

use seed::{prelude::*, *};
use shuffle_core::{
    video::embed_url, Artist, CatalogError, EngineState, RotationEngine, Song, SongId,
};

const CATALOG_URL: &str = "/api/songs";

// ------ ------
//     Init
// ------ ------

// The catalog is fetched exactly once; the rotation lives for the page session.
fn init(_: Url, orders: &mut impl Orders<Msg>) -> Model {
    orders.perform_cmd(async { Msg::CatalogFetched(request_catalog().await) });

    Model {
        loaded: LoadingState::Loading,
        player: None,
        notice: None,
    }
}

// ------ ------
//     Model
// ------ ------

#[derive(Debug, PartialEq, Eq)]
enum LoadingState {
    Done,
    Error(String),
    Loading,
}

struct Model {
    loaded: LoadingState,
    player: Option<RotationEngine>,
    notice: Option<String>,
}

impl Model {
    fn catalog_loaded(&mut self, catalog: Result<Vec<Song>, CatalogError>) {
        match catalog {
            Ok(songs) => {
                self.player = Some(RotationEngine::initialize(songs));
                self.loaded = LoadingState::Done;
            }
            Err(err) => self.loaded = LoadingState::Error(err.to_string()),
        }
    }

    fn skip(&mut self) {
        if let Some(player) = self.player.as_mut() {
            player.advance();
        }
        self.notice = None;
    }

    fn reopen(&mut self, id: SongId) {
        let Some(player) = self.player.as_mut() else {
            return;
        };
        self.notice = player.select_by_id(id).err().map(|err| err.to_string());
    }
}

// ------ ------
//    Update
// ------ ------

enum Msg {
    CatalogFetched(fetch::Result<Vec<Song>>),
    Skip,
    Reopen(SongId),
}

fn update(msg: Msg, model: &mut Model, _: &mut impl Orders<Msg>) {
    match msg {
        Msg::CatalogFetched(fetch_result) => {
            let catalog = fetch_result
                .map_err(|err| CatalogError::CatalogUnavailable(format!("{:?}", err)));
            if let Err(err) = &catalog {
                error!("failed to load catalog:", err.to_string());
            }
            model.catalog_loaded(catalog);
        }
        Msg::Skip => model.skip(),
        Msg::Reopen(id) => model.reopen(id),
    }
}

async fn request_catalog() -> fetch::Result<Vec<Song>> {
    let request = Request::new(CATALOG_URL).method(Method::Get);

    let response = fetch(request).await?.check_status()?;
    let payload = response.json().await?;

    Ok(payload)
}

// ------ ------
//     View
// ------ ------

fn view(model: &Model) -> Node<Msg> {
    div![
        C!["content"],
        div![C!["app-title"], "Vtuber Shuffle"],
        match (&model.loaded, &model.player) {
            (LoadingState::Done, Some(player)) => view_player(player, &model.notice),
            (LoadingState::Error(msg), _) => div![C!["error"], format!("loading failed: {}", msg)],
            _ => div!["loading....."],
        }
    ]
}

fn view_player(player: &RotationEngine, notice: &Option<String>) -> Node<Msg> {
    if player.state() == EngineState::Empty {
        return div![C!["now-playing"], "No songs in the catalog yet."];
    }

    div![
        player.current().map(view_now_playing),
        button![C!["skip-button"], "Skip", ev(Ev::Click, |_| Msg::Skip)],
        notice.as_ref().map(|text| div![C!["notice"], text]),
        view_history(&player.history()),
    ]
}

fn view_now_playing(song: &Song) -> Node<Msg> {
    div![
        match embed_url(&song.url) {
            Some(src) => iframe![
                C!["video-embed"],
                attrs! {At::Src => src},
            ],
            None => div![C!["video-embed", "missing"], "No embeddable video for this song"],
        },
        div![C!["now-playing"], format!("Now playing: {}", song.now_playing())],
        view_profile(&song.artists),
    ]
}

fn view_profile(artists: &[Artist]) -> Node<Msg> {
    if artists.is_empty() {
        return div![C!["artist-profile"], div![C!["artist-name"], "Unknown artist"]];
    }

    div![
        C!["artist-profile"],
        artists.iter().map(|artist| {
            div![
                C!["artist-card"],
                div![C!["artist-name"], &artist.name],
                div![
                    C!["artist-affiliation"],
                    artist.affiliation.clone().unwrap_or_default()
                ],
            ]
        })
    ]
}

fn view_history(history: &[&Song]) -> Node<Msg> {
    div![
        C!["history"],
        h3!["History"],
        ol![
            C!["history-list"],
            history.iter().map(|song| {
                let id = song.id;
                li![
                    style! {St::Cursor => "pointer"},
                    song.now_playing(),
                    ev(Ev::Click, move |_| Msg::Reopen(id)),
                ]
            })
        ]
    ]
}

// ------ ------
//     Start
// ------ ------

// (This function is invoked by `init` function in `index.html`.)
#[wasm_bindgen(start)]
pub fn start() {
    // Mount the `app` to the element with the `id` "app".
    App::start("app", init, update, view);
}
