use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};

use super::DatabaseError;
use crate::models::enums::*;
use crate::models::*;

fn parse_datetime(value: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f"))
        .unwrap_or_default()
}

// ═══════════════════════════════════════════
// Match Repository
// ═══════════════════════════════════════════

const MATCH_COLUMNS: &str = "id, player1_name, player2_name, event, location, round, match_length,
     match_date, import_date, file_path, source_format, game_count, match_hash, canonical_hash";

/// Insert a match header. `m.id` is ignored; the new row id is returned.
pub fn insert_match(conn: &Connection, m: &Match) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO match (player1_name, player2_name, event, location, round, match_length,
         match_date, import_date, file_path, source_format, game_count, match_hash, canonical_hash)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            m.player1_name,
            m.player2_name,
            m.event,
            m.location,
            m.round,
            m.match_length,
            m.match_date.map(|d| d.to_string()),
            m.import_date.to_string(),
            m.file_path,
            m.source_format.as_str(),
            m.game_count,
            m.match_hash,
            m.canonical_hash,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_match(conn: &Connection, id: i64) -> Result<Option<Match>, DatabaseError> {
    let sql = format!("SELECT {MATCH_COLUMNS} FROM match WHERE id = ?1");
    let row = conn
        .query_row(&sql, params![id], MatchRow::read)
        .optional()?;
    row.map(match_from_row).transpose()
}

pub fn list_matches(conn: &Connection) -> Result<Vec<Match>, DatabaseError> {
    let sql = format!("SELECT {MATCH_COLUMNS} FROM match ORDER BY id");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], MatchRow::read)?;

    let mut matches = Vec::new();
    for row in rows {
        matches.push(match_from_row(row?)?);
    }
    Ok(matches)
}

/// Match already holding this artifact hash, either as its own header hash
/// or as a merged artifact.
pub fn find_match_by_artifact_hash(
    conn: &Connection,
    match_hash: &str,
) -> Result<Option<i64>, DatabaseError> {
    let id = conn
        .query_row(
            "SELECT id FROM match WHERE match_hash = ?1
             UNION
             SELECT match_id FROM match_artifact WHERE match_hash = ?1
             LIMIT 1",
            params![match_hash],
            |row| row.get::<_, i64>(0),
        )
        .optional()?;
    Ok(id)
}

pub fn find_match_by_canonical_hash(
    conn: &Connection,
    canonical_hash: &str,
) -> Result<Option<i64>, DatabaseError> {
    let id = conn
        .query_row(
            "SELECT id FROM match WHERE canonical_hash = ?1 ORDER BY id LIMIT 1",
            params![canonical_hash],
            |row| row.get::<_, i64>(0),
        )
        .optional()?;
    Ok(id)
}

/// Delete a match and every position that only it referenced.
/// Returns the number of positions removed.
pub fn delete_match(conn: &Connection, id: i64) -> Result<usize, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT mv.position_id FROM move mv
         JOIN game g ON mv.game_id = g.id
         WHERE g.match_id = ?1 AND mv.position_id IS NOT NULL
         UNION
         SELECT mv.response_position_id FROM move mv
         JOIN game g ON mv.game_id = g.id
         WHERE g.match_id = ?1 AND mv.response_position_id IS NOT NULL
         UNION
         SELECT position_id FROM match_position WHERE match_id = ?1",
    )?;
    let position_ids = stmt
        .query_map(params![id], |row| row.get::<_, i64>(0))?
        .collect::<Result<Vec<i64>, _>>()?;
    drop(stmt);

    let deleted = conn.execute("DELETE FROM match WHERE id = ?1", params![id])?;
    if deleted == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Match".into(),
            id: id.to_string(),
        });
    }

    let mut removed = 0;
    for position_id in position_ids {
        removed += conn.execute(
            "DELETE FROM position WHERE id = ?1
             AND NOT EXISTS (SELECT 1 FROM move WHERE position_id = ?1 OR response_position_id = ?1)
             AND NOT EXISTS (SELECT 1 FROM match_position WHERE position_id = ?1)
             AND NOT EXISTS (SELECT 1 FROM collection_position WHERE position_id = ?1)",
            params![position_id],
        )?;
    }
    Ok(removed)
}

struct MatchRow {
    id: i64,
    player1_name: String,
    player2_name: String,
    event: String,
    location: String,
    round: String,
    match_length: i32,
    match_date: Option<String>,
    import_date: String,
    file_path: String,
    source_format: String,
    game_count: i32,
    match_hash: String,
    canonical_hash: String,
}

impl MatchRow {
    fn read(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            player1_name: row.get(1)?,
            player2_name: row.get(2)?,
            event: row.get(3)?,
            location: row.get(4)?,
            round: row.get(5)?,
            match_length: row.get(6)?,
            match_date: row.get(7)?,
            import_date: row.get(8)?,
            file_path: row.get(9)?,
            source_format: row.get(10)?,
            game_count: row.get(11)?,
            match_hash: row.get(12)?,
            canonical_hash: row.get(13)?,
        })
    }
}

fn match_from_row(row: MatchRow) -> Result<Match, DatabaseError> {
    Ok(Match {
        id: row.id,
        player1_name: row.player1_name,
        player2_name: row.player2_name,
        event: row.event,
        location: row.location,
        round: row.round,
        match_length: row.match_length,
        match_date: row.match_date.as_deref().map(parse_datetime),
        import_date: parse_datetime(&row.import_date),
        file_path: row.file_path,
        source_format: MatchFormat::from_str(&row.source_format)?,
        game_count: row.game_count,
        match_hash: row.match_hash,
        canonical_hash: row.canonical_hash,
    })
}

// ═══════════════════════════════════════════
// Match Artifact Repository
// ═══════════════════════════════════════════

pub fn insert_artifact(conn: &Connection, artifact: &MatchArtifact) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO match_artifact (match_id, match_hash, source_format, file_path, imported_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            artifact.match_id,
            artifact.match_hash,
            artifact.source_format.as_str(),
            artifact.file_path,
            artifact.imported_at.to_string(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn list_artifacts(conn: &Connection, match_id: i64) -> Result<Vec<MatchArtifact>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, match_id, match_hash, source_format, file_path, imported_at
         FROM match_artifact WHERE match_id = ?1 ORDER BY id",
    )?;
    let rows = stmt.query_map(params![match_id], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, i64>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, String>(5)?,
        ))
    })?;

    let mut artifacts = Vec::new();
    for row in rows {
        let (id, match_id, match_hash, source_format, file_path, imported_at) = row?;
        artifacts.push(MatchArtifact {
            id,
            match_id,
            match_hash,
            source_format: MatchFormat::from_str(&source_format)?,
            file_path,
            imported_at: parse_datetime(&imported_at),
        });
    }
    Ok(artifacts)
}

// ═══════════════════════════════════════════
// Game Repository
// ═══════════════════════════════════════════

pub fn insert_game(conn: &Connection, game: &Game) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO game (match_id, game_number, initial_score_1, initial_score_2,
         winner, points_won, move_count)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            game.match_id,
            game.game_number,
            game.initial_score[0],
            game.initial_score[1],
            game.winner,
            game.points_won,
            game.move_count,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn list_games(conn: &Connection, match_id: i64) -> Result<Vec<Game>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, match_id, game_number, initial_score_1, initial_score_2,
         winner, points_won, move_count
         FROM game WHERE match_id = ?1 ORDER BY game_number",
    )?;
    let rows = stmt.query_map(params![match_id], |row| {
        Ok(Game {
            id: row.get(0)?,
            match_id: row.get(1)?,
            game_number: row.get(2)?,
            initial_score: [row.get(3)?, row.get(4)?],
            winner: row.get(5)?,
            points_won: row.get(6)?,
            move_count: row.get(7)?,
        })
    })?;

    let mut games = Vec::new();
    for row in rows {
        games.push(row?);
    }
    Ok(games)
}

// ═══════════════════════════════════════════
// Move Repository
// ═══════════════════════════════════════════

pub fn insert_move(conn: &Connection, mv: &Move) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO move (game_id, move_number, move_type, position_id, response_position_id,
         player, dice_1, dice_2, checker_move, cube_action)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            mv.game_id,
            mv.move_number,
            mv.kind.as_str(),
            mv.position_id,
            mv.response_position_id,
            mv.player,
            mv.dice[0],
            mv.dice[1],
            mv.checker_move,
            mv.cube_action.map(|a| a.as_str()),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn list_moves(conn: &Connection, game_id: i64) -> Result<Vec<Move>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, game_id, move_number, move_type, position_id, response_position_id,
         player, dice_1, dice_2, checker_move, cube_action
         FROM move WHERE game_id = ?1 ORDER BY move_number",
    )?;
    let rows = stmt.query_map(params![game_id], |row| {
        Ok(MoveRow {
            id: row.get(0)?,
            game_id: row.get(1)?,
            move_number: row.get(2)?,
            kind: row.get(3)?,
            position_id: row.get(4)?,
            response_position_id: row.get(5)?,
            player: row.get(6)?,
            dice: [row.get(7)?, row.get(8)?],
            checker_move: row.get(9)?,
            cube_action: row.get(10)?,
        })
    })?;

    let mut moves = Vec::new();
    for row in rows {
        let row = row?;
        moves.push(Move {
            id: row.id,
            game_id: row.game_id,
            move_number: row.move_number,
            kind: MoveKind::from_str(&row.kind)?,
            position_id: row.position_id,
            response_position_id: row.response_position_id,
            player: row.player,
            dice: row.dice,
            checker_move: row.checker_move,
            cube_action: row.cube_action.as_deref().map(CubeAction::from_str).transpose()?,
        });
    }
    Ok(moves)
}

struct MoveRow {
    id: i64,
    game_id: i64,
    move_number: i32,
    kind: String,
    position_id: Option<i64>,
    response_position_id: Option<i64>,
    player: i32,
    dice: [i32; 2],
    checker_move: Option<String>,
    cube_action: Option<String>,
}

// ═══════════════════════════════════════════
// Position & Analysis Repository
// ═══════════════════════════════════════════

pub fn find_position_by_key(conn: &Connection, identity_key: &str) -> Result<Option<i64>, DatabaseError> {
    let id = conn
        .query_row(
            "SELECT id FROM position WHERE identity_key = ?1",
            params![identity_key],
            |row| row.get::<_, i64>(0),
        )
        .optional()?;
    Ok(id)
}

pub fn insert_position(conn: &Connection, identity_key: &str, state: &str) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO position (identity_key, state) VALUES (?1, ?2)",
        params![identity_key, state],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_position(conn: &Connection, id: i64) -> Result<Option<Position>, DatabaseError> {
    let state = conn
        .query_row(
            "SELECT state FROM position WHERE id = ?1",
            params![id],
            |row| row.get::<_, String>(0),
        )
        .optional()?;
    match state {
        Some(s) => Ok(Some(serde_json::from_str(&s)?)),
        None => Ok(None),
    }
}

pub fn get_analysis(conn: &Connection, position_id: i64) -> Result<Option<PositionAnalysis>, DatabaseError> {
    let data = conn
        .query_row(
            "SELECT data FROM analysis WHERE position_id = ?1",
            params![position_id],
            |row| row.get::<_, String>(0),
        )
        .optional()?;
    match data {
        Some(d) => Ok(Some(serde_json::from_str(&d)?)),
        None => Ok(None),
    }
}

/// Insert or replace the single analysis row of a position.
pub fn upsert_analysis(
    conn: &Connection,
    position_id: i64,
    analysis: &PositionAnalysis,
) -> Result<(), DatabaseError> {
    let data = serde_json::to_string(analysis)?;
    conn.execute(
        "INSERT INTO analysis (position_id, data) VALUES (?1, ?2)
         ON CONFLICT(position_id) DO UPDATE SET data = excluded.data",
        params![position_id, data],
    )?;
    Ok(())
}

/// Record that an import of this match touched a position.
pub fn link_match_position(conn: &Connection, match_id: i64, position_id: i64) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT OR IGNORE INTO match_position (match_id, position_id) VALUES (?1, ?2)",
        params![match_id, position_id],
    )?;
    Ok(())
}

// ═══════════════════════════════════════════
// Statistics
// ═══════════════════════════════════════════

pub fn get_stats(conn: &Connection) -> Result<DatabaseStats, DatabaseError> {
    let count = |table: &str| -> Result<i64, DatabaseError> {
        let n = conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
        Ok(n)
    };
    Ok(DatabaseStats {
        matches: count("match")?,
        games: count("game")?,
        moves: count("move")?,
        positions: count("position")?,
        analyses: count("analysis")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    fn sample_match(hash: &str) -> Match {
        Match {
            id: 0,
            player1_name: "Alice".into(),
            player2_name: "Bob".into(),
            event: "Club night".into(),
            location: String::new(),
            round: String::new(),
            match_length: 5,
            match_date: None,
            import_date: chrono::Local::now().naive_local(),
            file_path: "/tmp/a.xg".into(),
            source_format: MatchFormat::Xg,
            game_count: 1,
            match_hash: hash.into(),
            canonical_hash: "canon".into(),
        }
    }

    fn insert_move_at(conn: &Connection, game_id: i64, number: i32, position_id: Option<i64>) {
        insert_move(
            conn,
            &Move {
                id: 0,
                game_id,
                move_number: number,
                kind: MoveKind::Checker,
                position_id,
                response_position_id: None,
                player: 0,
                dice: [3, 1],
                checker_move: Some("8/5 6/5".into()),
                cube_action: None,
            },
        )
        .unwrap();
    }

    fn insert_game_for(conn: &Connection, match_id: i64) -> i64 {
        insert_game(
            conn,
            &Game {
                id: 0,
                match_id,
                game_number: 1,
                initial_score: [0, 0],
                winner: 0,
                points_won: 1,
                move_count: 1,
            },
        )
        .unwrap()
    }

    #[test]
    fn match_round_trip() {
        let conn = open_memory_database().unwrap();
        let id = insert_match(&conn, &sample_match("h1")).unwrap();
        let loaded = get_match(&conn, id).unwrap().unwrap();
        assert_eq!(loaded.player1_name, "Alice");
        assert_eq!(loaded.source_format, MatchFormat::Xg);
        assert_eq!(loaded.canonical_hash, "canon");
        assert!(get_match(&conn, id + 1).unwrap().is_none());
    }

    #[test]
    fn artifact_hash_lookup_covers_merged_artifacts() {
        let conn = open_memory_database().unwrap();
        let id = insert_match(&conn, &sample_match("h1")).unwrap();
        insert_artifact(
            &conn,
            &MatchArtifact {
                id: 0,
                match_id: id,
                match_hash: "h2".into(),
                source_format: MatchFormat::GnubgSgf,
                file_path: "/tmp/a.sgf".into(),
                imported_at: chrono::Local::now().naive_local(),
            },
        )
        .unwrap();

        assert_eq!(find_match_by_artifact_hash(&conn, "h1").unwrap(), Some(id));
        assert_eq!(find_match_by_artifact_hash(&conn, "h2").unwrap(), Some(id));
        assert_eq!(find_match_by_artifact_hash(&conn, "h3").unwrap(), None);
        assert_eq!(list_artifacts(&conn, id).unwrap().len(), 1);
    }

    #[test]
    fn analysis_upsert_replaces() {
        let conn = open_memory_database().unwrap();
        let pid = insert_position(&conn, "key", "{}").unwrap();
        let mut analysis = PositionAnalysis::new("XG");
        upsert_analysis(&conn, pid, &analysis).unwrap();
        analysis.played_moves.push("24/18".into());
        upsert_analysis(&conn, pid, &analysis).unwrap();

        let loaded = get_analysis(&conn, pid).unwrap().unwrap();
        assert_eq!(loaded.played_moves, vec!["24/18".to_string()]);
        assert_eq!(get_stats(&conn).unwrap().analyses, 1);
    }

    #[test]
    fn delete_match_keeps_shared_and_collected_positions() {
        let conn = open_memory_database().unwrap();
        let own = insert_position(&conn, "own", "{}").unwrap();
        let shared = insert_position(&conn, "shared", "{}").unwrap();
        let collected = insert_position(&conn, "collected", "{}").unwrap();

        let first = insert_match(&conn, &sample_match("h1")).unwrap();
        let g1 = insert_game_for(&conn, first);
        insert_move_at(&conn, g1, 1, Some(own));
        insert_move_at(&conn, g1, 2, Some(shared));
        insert_move_at(&conn, g1, 3, Some(collected));

        let second = insert_match(&conn, &sample_match("h2")).unwrap();
        let g2 = insert_game_for(&conn, second);
        insert_move_at(&conn, g2, 1, Some(shared));

        conn.execute("INSERT INTO collection (name) VALUES ('openings')", []).unwrap();
        conn.execute(
            "INSERT INTO collection_position (collection_id, position_id) VALUES (1, ?1)",
            params![collected],
        )
        .unwrap();

        let removed = delete_match(&conn, first).unwrap();
        assert_eq!(removed, 1);
        assert!(get_match(&conn, first).unwrap().is_none());
        assert_eq!(find_position_by_key(&conn, "own").unwrap(), None);
        assert_eq!(find_position_by_key(&conn, "shared").unwrap(), Some(shared));
        assert_eq!(find_position_by_key(&conn, "collected").unwrap(), Some(collected));

        let stats = get_stats(&conn).unwrap();
        assert_eq!(stats.matches, 1);
        assert_eq!(stats.games, 1);
        assert_eq!(stats.moves, 1);
    }

    #[test]
    fn delete_match_removes_take_decision_positions() {
        let conn = open_memory_database().unwrap();
        let doubled = insert_position(&conn, "doubled", "{}").unwrap();
        let response = insert_position(&conn, "response", "{}").unwrap();
        let id = insert_match(&conn, &sample_match("h1")).unwrap();
        let g = insert_game_for(&conn, id);
        insert_move(
            &conn,
            &Move {
                id: 0,
                game_id: g,
                move_number: 1,
                kind: MoveKind::Cube,
                position_id: Some(doubled),
                response_position_id: Some(response),
                player: 1,
                dice: [0, 0],
                checker_move: None,
                cube_action: Some(CubeAction::Take),
            },
        )
        .unwrap();

        let loaded = &list_moves(&conn, g).unwrap()[0];
        assert_eq!(loaded.response_position_id, Some(response));
        assert_eq!(loaded.cube_action, Some(CubeAction::Take));

        assert_eq!(delete_match(&conn, id).unwrap(), 2);
        assert_eq!(get_stats(&conn).unwrap().positions, 0);
    }

    #[test]
    fn delete_match_removes_linked_positions_without_moves() {
        let conn = open_memory_database().unwrap();
        let merged = insert_position(&conn, "merged", "{}").unwrap();
        let other = insert_position(&conn, "other", "{}").unwrap();
        upsert_analysis(&conn, merged, &PositionAnalysis::new("XG")).unwrap();

        let id = insert_match(&conn, &sample_match("h1")).unwrap();
        link_match_position(&conn, id, merged).unwrap();
        link_match_position(&conn, id, merged).unwrap();
        let keeper = insert_match(&conn, &sample_match("h2")).unwrap();
        link_match_position(&conn, id, other).unwrap();
        link_match_position(&conn, keeper, other).unwrap();

        assert_eq!(delete_match(&conn, id).unwrap(), 1);
        assert_eq!(find_position_by_key(&conn, "merged").unwrap(), None);
        assert_eq!(find_position_by_key(&conn, "other").unwrap(), Some(other));
        assert_eq!(get_stats(&conn).unwrap().analyses, 0);
    }

    #[test]
    fn delete_missing_match_is_not_found() {
        let conn = open_memory_database().unwrap();
        assert!(matches!(
            delete_match(&conn, 42),
            Err(DatabaseError::NotFound { .. })
        ));
    }

    #[test]
    fn moves_list_in_order() {
        let conn = open_memory_database().unwrap();
        let id = insert_match(&conn, &sample_match("h1")).unwrap();
        let g = insert_game_for(&conn, id);
        insert_move_at(&conn, g, 2, None);
        insert_move_at(&conn, g, 1, None);
        let moves = list_moves(&conn, g).unwrap();
        assert_eq!(moves.iter().map(|m| m.move_number).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(list_games(&conn, id).unwrap().len(), 1);
    }
}
