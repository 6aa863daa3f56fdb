//! End-to-end play: games loaded from source and driven one command at a
//! time through the headless sink.

use jacl_core::object::slot;
use jacl_core::relations::{check_light, grand_of};
use jacl_core::{NOWHERE, ObjectId, World};
use jacl_dsl::lexer::lex_command;
use jacl_engine::parser::{Matcher, Vocabulary};
use jacl_engine::{EngineConfig, HeadlessSink, Interpreter, Pronouns};
use proptest::prelude::*;

fn start(source: &str) -> Interpreter<HeadlessSink> {
    let mut game = Interpreter::from_source(source, HeadlessSink::new(), EngineConfig::new().with_seed(7)).unwrap();
    game.boot().unwrap();
    game.sink_mut().take_output();
    game
}

fn play(game: &mut Interpreter<HeadlessSink>, line: &str) -> String {
    game.process_line(line).unwrap();
    game.sink_mut().take_output()
}

fn id(game: &Interpreter<HeadlessSink>, label: &str) -> ObjectId {
    game.world().find_label(label).unwrap()
}

fn parent(game: &Interpreter<HeadlessSink>, label: &str) -> ObjectId {
    game.world().get(id(game, label)).unwrap().parent()
}

fn integers(world: &World) -> Vec<(String, Vec<i32>)> {
    world
        .symbols
        .integers()
        .map(|(name, cells)| (name.to_string(), cells.iter().map(|c| c.value).collect()))
        .collect()
}

/// Slots, attributes and integers: the state undo and restore must recover.
fn state(world: &World) -> (Vec<([i32; 16], u32, u32)>, Vec<(String, Vec<i32>)>) {
    let objects = world
        .objects()
        .map(|(_, o)| (o.slots, o.attributes, o.user_attributes))
        .collect();
    (objects, integers(world))
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn putting_an_object_in_a_container() {
    let mut game = start(
        "\
location cave : cave
object me : me
  player
object key : key
  mass 3
object chest : chest
  has CONTAINER
  quantity 10
grammar put *present in *present >put_in
{+put_in
move noun1 to noun2
write \"Done.^\"
}
",
    );
    assert_eq!(play(&mut game, "put key in chest"), "Done.\n");
    assert_eq!(parent(&game, "key"), id(&game, "chest"));
    let chest = game.world().get(id(&game, "chest")).unwrap();
    assert_eq!(chest.slots[slot::QUANTITY], 7);
}

#[test]
fn a_luminous_object_lights_a_dark_location() {
    let mut game = start(
        "\
location cellar : cellar
  has DARK
object me : me
  player
object torch : torch
  has LUMINOUS
  parent me
{+dim
ensure torch hasnt LUMINOUS
}
",
    );
    let cellar = id(&game, "cellar");
    assert!(check_light(game.world(), cellar));
    game.execute_function("+dim").unwrap();
    assert!(!check_light(game.world(), cellar));
}

#[test]
fn it_refers_to_the_last_object() {
    let mut game = start(
        "\
location hall : hall
object me : me
  player
object red_ball : red ball
object blue_ball : blue ball
filter the
grammar take *present >take
grammar drop *held >drop
{+take
move noun1 to player
}
{+drop
move noun1 to here
}
",
    );
    play(&mut game, "take the red ball");
    let output = play(&mut game, "drop it");
    assert_eq!(output, "");
    let ball = id(&game, "red_ball");
    assert_eq!(game.command().nouns[0], ball);
    assert_eq!(game.pronouns().it, ball);
    assert_eq!(parent(&game, "red_ball"), id(&game, "hall"));
}

#[test]
fn dropping_all_except_one() {
    let mut game = start(
        "\
location hall : hall
object me : me
  player
object coin : coin
  parent me
object gem : gem
  parent me
object rope : rope
  parent me
grammar drop **held >drop
{+drop
move noun1 to here
write \"Dropped.^\"
}
",
    );
    let output = play(&mut game, "drop all except coin");
    assert_eq!(output, "gem: Dropped.\nrope: Dropped.\n");
    assert_eq!(parent(&game, "coin"), id(&game, "me"));
    assert_eq!(parent(&game, "gem"), id(&game, "hall"));
    assert_eq!(parent(&game, "rope"), id(&game, "hall"));
    assert_eq!(game.command().lists[0].len(), 2);
}

#[test]
fn proxied_movement_repeated_with_again() {
    let mut game = start(
        "\
location first : first room
  north second
location second : second room
  north third
location third : third room
object me : me
  player
  parent first
grammar north >verb_north
grammar go north >go_north
{+verb_north
proxy \"go north\"
}
{+go_north
travel north
}
",
    );
    play(&mut game, "north");
    assert_eq!(parent(&game, "me"), id(&game, "second"));
    assert_eq!(game.world().symbols.integer("total_moves"), 1);
    play(&mut game, "again");
    assert_eq!(parent(&game, "me"), id(&game, "third"));
    assert_eq!(game.world().symbols.integer("total_moves"), 2);
}

#[test]
fn restoring_a_saved_game() {
    let mut game = start(
        "\
location hall : hall
object me : me
  player
object key : key
  mass 1
integer ok 0
grammar take *present >take
grammar drop *held >drop
grammar save $word >save
grammar restore $word >restore
{+take
move noun1 to player
points 5
}
{+drop
move noun1 to here
}
{+save
savegame ok $word
}
{+restore
restoregame ok $word
}
",
    );
    play(&mut game, "take key");
    play(&mut game, "save s1");
    assert!(game.sink().snapshot("s1").is_some());
    let saved = integers(game.world());

    play(&mut game, "drop key");
    assert_eq!(parent(&game, "key"), id(&game, "hall"));
    play(&mut game, "restore s1");

    assert_eq!(parent(&game, "key"), id(&game, "me"));
    assert_eq!(game.world().symbols.integer("score"), 5);
    assert_eq!(game.world().symbols.integer("total_moves"), 1);
    assert_eq!(integers(game.world()), saved);
}

#[test]
fn a_session_from_boot_to_end_of_input() {
    let source = "\
location hall : hall
object me : me
  player
grammar look >look
{+intro
write \"Welcome.^\"
}
{+look
write \"A bare hall.^\"
}
";
    let sink = HeadlessSink::with_input(["look", "dance"]);
    let mut game = Interpreter::from_source(source, sink, EngineConfig::new().with_seed(7)).unwrap();
    game.run().unwrap();
    let output = game.sink_mut().take_output();
    insta::assert_snapshot!(output.trim_end(), @r#"
    Welcome.

    > look
    A bare hall.

    > dance
    You can't use the word "dance" in that context.

    >
    "#);
    assert_eq!(game.world().symbols.integer("total_moves"), 1);
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

const PROPERTY_GAME: &str = "\
location hall : hall
  has VISITED
  north attic
location attic : attic
  has VISITED
  south hall
object me : me
  player
  parent hall
object box : wooden box
  has CONTAINER
  parent hall
object coin : gold coin
  plural coins
  mass 1
  parent hall
object coin2 : silver coin
  plural coins
  mass 1
  parent hall
object rope : rope
  mass 2
  parent hall
integer looks 0
grammar look >look
grammar take **present >take
grammar drop **held >drop
grammar put **held in *present >put_in
grammar north >north
grammar south >south
{+look
set looks + 1
}
{+take
move noun1 to player
points 1
}
{+drop
move noun1 to here
}
{+put_in
move noun1 to noun2
}
{+north
travel north
}
{+south
travel south
}
";

const COMMANDS: &[&str] = &[
    "look",
    "take coins",
    "take all",
    "take rope",
    "drop all",
    "drop gold coin",
    "put all in box",
    "put rope in box",
    "take all except rope",
    "north",
    "south",
    "take widget",
    "dance",
];

const WORDS: &[&str] = &[
    "take", "drop", "put", "in", "all", "except", "but", "and", ",", "coin", "coins", "gold", "silver", "rope",
    "box", "it", "them", "two", "from", "look", "north", "lamp",
];

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn undo_returns_to_the_state_before_the_command(
        history in proptest::collection::vec(proptest::sample::select(COMMANDS), 0..6),
        last in proptest::sample::select(COMMANDS),
    ) {
        let mut game = start(PROPERTY_GAME);
        for command in history {
            play(&mut game, command);
        }
        let before = state(game.world());
        play(&mut game, last);
        play(&mut game, "undo");
        prop_assert_eq!(state(game.world()), before);
    }

    #[test]
    fn containment_always_reaches_a_location(
        moves in proptest::collection::vec((0usize..6, 0usize..6), 1..12),
    ) {
        let labels = ["hall", "box", "coin", "coin2", "rope", "me"];
        let body: String = moves
            .iter()
            .map(|(what, to)| format!("move {} to {}\n", labels[*what], labels[*to]))
            .collect();
        let source = format!("{PROPERTY_GAME}{{+shuffle\n{body}}}\n");
        let mut game = start(&source);
        game.execute_function("+shuffle").unwrap();
        let world = game.world();
        for id in world.ids() {
            let top = grand_of(world, id, false).unwrap();
            prop_assert!(top == NOWHERE || world.get(top).unwrap().is_location());
        }
    }

    #[test]
    fn matching_is_deterministic(
        words in proptest::collection::vec(proptest::sample::select(WORDS), 1..7),
    ) {
        let game = start(PROPERTY_GAME);
        let world = game.world();
        let pronouns = Pronouns::default();
        let vocabulary = Vocabulary::of(world);
        let command = lex_command(&words.join(" "));
        let first = Matcher::new(world, &pronouns, &vocabulary, &command).run(world.grammar.roots());
        let second = Matcher::new(world, &pronouns, &vocabulary, &command).run(world.grammar.roots());
        prop_assert_eq!(&first, &second);
        if let Ok(found) = first {
            prop_assert!(found.lists.iter().flatten().all(|id| world.is_valid(*id)));
            prop_assert!(!found.action.is_empty());
        }
    }
}
