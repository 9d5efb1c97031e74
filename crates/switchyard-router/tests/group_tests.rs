//! Integration tests for group composition and endpoints
//!
//! Covers:
//! - Prefix and name concatenation
//! - Middleware levels, renderer and controller inheritance
//! - Deferred versus immediate creation
//! - Endpoint verb mapping

use axum::http::Method;
use pretty_assertions::assert_eq;
use switchyard_router::*;

/// Middleware that only carries a label
struct Tag(&'static str);

impl Middleware for Tag {
    fn process(&self, request: Request, next: Next<'_>) -> anyhow::Result<Response> {
        next.run(request)
    }

    fn name(&self) -> &str {
        self.0
    }
}

fn labels(route: &Route) -> Vec<Vec<String>> {
    route
        .middleware()
        .into_iter()
        .map(|level| level.iter().map(|m| m.name().to_string()).collect())
        .collect()
}

fn get(router: &Router, uri: &str) -> RouteMatch {
    router
        .match_request(&Request::new("GET", uri).unwrap())
        .unwrap()
}

fn index_route() -> Route {
    Route::new("/", View::handler(|_, _| Ok(Reply::data(())))).unwrap()
}

#[test]
fn test_matching_named() {
    let mut router = Router::new();
    router.add_route(index_route().with_name("index")).unwrap();

    let mut group = Group::new("/albums", |group| {
        group.add_route(Route::get("/home", "Albums::home")?.with_name("home"))?;
        group.add_route(Route::get("/{name}", "Albums::name")?.with_name("name"))?;
        group.add_route(Route::get("", "Albums::list")?.with_name("list"))
    })
    .with_name_prefix("albums:");
    group.create(&mut router).unwrap();

    assert_eq!(get(&router, "").name(), Some("index"));
    assert_eq!(get(&router, "/albums/symbolic").name(), Some("albums:name"));
    assert_eq!(get(&router, "/albums/home").name(), Some("albums:home"));
    assert_eq!(get(&router, "/albums").name(), Some("albums:list"));
    assert_eq!(
        router.route_url("albums:name", [("name", "symbolic")]).unwrap(),
        "/albums/symbolic"
    );
}

#[test]
fn test_matching_unnamed() {
    let mut router = Router::new();
    router.add_route(index_route()).unwrap();

    let mut group = Group::new("/albums", |group| {
        group.add_route(Route::get("/home", "Albums::home")?)?;
        group.add_route(Route::get("/{name}", "Albums::name")?)?;
        group.add_route(Route::get("", "Albums::list")?)
    })
    .with_name_prefix("albums:");
    group.create(&mut router).unwrap();

    assert_eq!(get(&router, "").name(), None);
    assert_eq!(get(&router, "/albums/symbolic").name(), None);
    assert_eq!(get(&router, "/albums").name(), None);
    assert!(router.route_by_name("albums:").is_none());
}

#[test]
fn test_matching_with_helper_methods() {
    let mut router = Router::new();
    let mut group = Group::new("/helper", |group| {
        group.get("/get", "Helper::run", Some("getroute"))?;
        group.post("/post", "Helper::run", Some("postroute"))?;
        group.put("/put", "Helper::run", Some("putroute"))?;
        group.patch("/patch", "Helper::run", Some("patchroute"))?;
        group.delete("/delete", "Helper::run", Some("deleteroute"))?;
        group.options("/options", "Helper::run", Some("optionsroute"))?;
        group.head("/head", "Helper::run", Some("headroute"))?;
        group.route("/route", "Helper::run", Some("allroute"))
    })
    .with_name_prefix("helper:");
    group.create(&mut router).unwrap();

    for (method, path, name) in [
        (Method::GET, "/helper/get", "helper:getroute"),
        (Method::POST, "/helper/post", "helper:postroute"),
        (Method::PUT, "/helper/put", "helper:putroute"),
        (Method::PATCH, "/helper/patch", "helper:patchroute"),
        (Method::DELETE, "/helper/delete", "helper:deleteroute"),
        (Method::OPTIONS, "/helper/options", "helper:optionsroute"),
        (Method::HEAD, "/helper/head", "helper:headroute"),
        (Method::GET, "/helper/route", "helper:allroute"),
        (Method::HEAD, "/helper/route", "helper:allroute"),
    ] {
        let matched = router.match_route(&method, path).unwrap();
        assert_eq!(matched.route.pattern(), path);
        assert_eq!(matched.name(), Some(name));
    }
    assert_eq!(router.route_url("helper:getroute", ()).unwrap(), "/helper/get");

    assert!(matches!(
        router.match_route(&Method::GET, "/helper/delete"),
        Err(Error::MethodNotAllowed { .. })
    ));
}

#[test]
fn test_renderer() {
    let mut router = Router::new();
    let mut group = Group::new("/albums", |group| {
        group.add_route(Route::get("", "Albums::list")?)?;
        group.add_route(Route::get("/home", "Albums::home")?.with_renderer("template"))?;
        group.add_route(Route::get("/{name}", "Albums::name")?)
    })
    .with_renderer("json");
    group.create(&mut router).unwrap();

    let kind = |uri: &str| get(&router, uri).route.renderer().map(|r| r.kind.clone());
    assert_eq!(kind("/albums/human"), Some("json".to_string()));
    assert_eq!(kind("/albums/home"), Some("template".to_string()));
    assert_eq!(kind("/albums"), Some("json".to_string()));
}

#[test]
fn test_nearest_group_renderer_wins() {
    let mut router = Router::new();
    let mut group = Group::new("/outer", |group| {
        group
            .group("/inner", |group| group.get("/page", "Pages::show", None))?
            .render("text");
        group.get("/page", "Pages::show", None)
    })
    .with_renderer("json");
    group.create(&mut router).unwrap();

    let inner = get(&router, "/outer/inner/page");
    assert_eq!(inner.route.renderer().unwrap().kind, "text");
    let outer = get(&router, "/outer/page");
    assert_eq!(outer.route.renderer().unwrap().kind, "json");
}

#[test]
fn test_controller_prefixing() {
    let mut router = Router::new();
    router.add_route(index_route()).unwrap();

    let mut group = Group::new("/albums", |group| {
        group.add_route(Route::get("-list", "albumList")?.with_name("list"))
    })
    .with_name_prefix("albums-")
    .with_controller("Albums");
    group.create(&mut router).unwrap();

    let matched = get(&router, "/albums-list");
    assert_eq!(matched.name(), Some("albums-list"));
    assert_eq!(matched.route.view().as_action(), Some(("Albums", "albumList")));
}

#[test]
fn test_controller_prefixing_error_using_closure() {
    let mut router = Router::new();
    let mut group = Group::new("/albums", |group| {
        group.add_route(Route::get("-list", View::handler(|_, _| Ok(Reply::data(()))))?)
    })
    .with_controller("Albums");

    let err = group.create(&mut router).unwrap_err();
    assert!(err.to_string().starts_with("Cannot add controller"));
    assert!(err.is_configuration());
    assert!(router.is_empty());
}

#[test]
fn test_controller_prefixing_error_using_endpoint() {
    let mut router = Router::new();
    let mut group = Group::new("/media", |group| {
        group.endpoint("/albums", "Albums", ["id"]).name("albums").add()
    })
    .with_controller("Media");

    let err = group.create(&mut router).unwrap_err();
    assert!(err.to_string().starts_with("Cannot add controller"));
}

#[test]
fn test_middleware() {
    let mut router = Router::new();
    let mut group = Group::new("/albums", |group| {
        group.add_route(Route::get("", "Albums::list")?)?;
        group.add_route(Route::get("/home", "Albums::home")?.with_middleware(Tag("mw3")))?;
        group.add_route(Route::get("/{name}", "Albums::name")?)
    })
    .with_middleware(Tag("mw2"));
    group.create(&mut router).unwrap();

    assert_eq!(labels(&get(&router, "/albums/human").route), vec![vec!["mw2"]]);
    assert_eq!(
        labels(&get(&router, "/albums/home").route),
        vec![vec!["mw2"], vec!["mw3"]]
    );
}

#[test]
fn test_fail_without_calling_create_before() {
    let mut group = Group::new("/albums", |_| Ok(())).with_name_prefix("test:");
    let err = group
        .add_route(Route::get("/", View::handler(|_, _| Ok(Reply::data("")))).unwrap())
        .unwrap_err();
    assert_eq!(err.to_string(), "RouteAdder not set");
}

#[test]
fn test_create_twice_registers_once() {
    let mut router = Router::new();
    let mut group = Group::new("/albums", |group| {
        group.get("", "Albums::list", None)?;
        group.get("/{name}", "Albums::name", None)
    });

    group.create(&mut router).unwrap();
    group.create(&mut router).unwrap();

    assert_eq!(router.len(), 2);
    assert_eq!(group.state(), GroupState::Created);
}

#[test]
fn test_created_group_rejects_further_routes() {
    let mut router = Router::new();
    let mut group = Group::new("/albums", |group| group.get("", "Albums::list", None));
    group.create(&mut router).unwrap();

    let err = group.get("/late", "Albums::late", None).unwrap_err();
    assert!(matches!(err, Error::GroupCreated(_)));
    assert_eq!(router.len(), 1);
    assert!(matches!(
        router.match_route(&Method::GET, "/albums/late"),
        Err(Error::NotFound { .. })
    ));
}

#[test]
fn test_controller_conflict_leaves_router_untouched() {
    let mut router = Router::new();
    let err = router
        .group("/albums", |group| {
            group.controller("Albums");
            group.get("", "list", Some("list"))?;
            group.get("/{name}", View::handler(|_, _| Ok(Reply::data(()))), None)
        })
        .unwrap_err();

    assert!(matches!(err, Error::ControllerConflict { .. }));
    assert!(router.is_empty());
    assert!(router.route_by_name("list").is_none());
}

#[test]
fn test_router_group_is_created_immediately() {
    let mut router = Router::new();
    router
        .group("/albums", |group| group.get("/{name}", "Albums::name", None))
        .unwrap();

    assert_eq!(get(&router, "/albums/human").params["name"], "human");
}

// ============================================================================
// Endpoints
// ============================================================================

#[test]
fn test_endpoint_in_group() {
    let mut router = Router::new();
    router.add_route(index_route()).unwrap();

    let mut group = Group::new("/media", |group| {
        group.endpoint("/albums", "Albums", ["id"]).name("albums").add()
    })
    .with_name_prefix("media-");
    group.create(&mut router).unwrap();

    let matched = get(&router, "/media/albums/666");
    assert_eq!(matched.name(), Some("media-albums-get"));
    assert_eq!(matched.route.view().as_action(), Some(("Albums", "get")));
    assert_eq!(matched.params.get("id").map(String::as_str), Some("666"));
}

#[test]
fn test_endpoint_collection_and_member() {
    let mut router = Router::new();
    router
        .endpoint("/endpoints", "Endpoints", ["id"])
        .add()
        .unwrap();

    let post = router
        .match_request(&Request::new("POST", "/endpoints").unwrap())
        .unwrap();
    assert_eq!(post.route.view().as_action(), Some(("Endpoints", "post")));
    assert!(post.params.is_empty());
    assert_eq!(post.name(), Some("endpoints-post"));

    for method in [Method::GET, Method::PUT, Method::PATCH, Method::DELETE, Method::HEAD, Method::OPTIONS] {
        let matched = router.match_route(&method, "/endpoints/13").unwrap();
        let action = method.as_str().to_ascii_lowercase();
        assert_eq!(matched.route.view().as_action(), Some(("Endpoints", action.as_str())));
        assert_eq!(matched.params["id"], "13");
    }

    assert!(matches!(
        router.match_route(&Method::GET, "/endpoints"),
        Err(Error::MethodNotAllowed { .. })
    ));
}

#[test]
fn test_endpoint_with_multiple_ids() {
    let mut router = Router::new();
    router
        .endpoint("/albums", "Tracks", ["album", "track"])
        .name("tracks")
        .add()
        .unwrap();

    let matched = router.match_route(&Method::DELETE, "/albums/7/3").unwrap();
    assert_eq!(matched.name(), Some("tracks-delete"));
    assert_eq!(matched.params["album"], "7");
    assert_eq!(matched.params["track"], "3");
    assert_eq!(
        router.route_url("tracks-get", [("album", 7), ("track", 3)]).unwrap(),
        "/albums/7/3"
    );
}

#[test]
fn test_nested_groups() {
    let mut router = Router::new();

    let mut media = Group::new("/media", |group| {
        // deferred: created when /media is created
        group.group("/music", |group| {
            // immediate: created right here, into /music
            group.add_group(
                Group::new("/albums", |group| {
                    Group::new("/songs", |group| {
                        group
                            .endpoint("/times", "Times", ["id"])
                            .name("times")
                            .middleware(Tag("times-middleware"))
                            .add()
                    })
                    .with_name_prefix("songs-")
                    .with_middleware(Tag("songs-middleware"))
                    .create(group)
                })
                .with_name_prefix("albums-")
                .with_middleware(Tag("albums-middleware")),
            )
        })?
        .set_name_prefix("music-");
        Ok(())
    })
    .with_name_prefix("media-")
    .with_middleware(Tag("media-middleware"));
    media.create(&mut router).unwrap();

    let matched = get(&router, "/media/music/albums/songs/times/666");
    assert_eq!(matched.name(), Some("media-music-albums-songs-times-get"));
    assert_eq!(matched.route.view().as_action(), Some(("Times", "get")));
    assert_eq!(matched.route.pattern(), "/media/music/albums/songs/times/{id}");
    assert_eq!(matched.params["id"], "666");
    assert_eq!(
        labels(&matched.route),
        vec![
            vec!["media-middleware"],
            vec!["albums-middleware"],
            vec!["songs-middleware"],
            vec!["times-middleware"],
        ]
    );
}
