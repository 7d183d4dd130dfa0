use armory_core::{EntityId, EntityKey, Record, Result, TeamSize};
use serde::Deserialize;
use serde_json::Value;

use super::{Character, Entity, Realm};
use crate::game::Faction;

entity! {
    /// A rated arena team.
    ArenaTeam
}

/// A team member with their games for the team.
#[derive(Debug, Clone)]
pub struct ArenaTeamMember {
    pub character: Character,
    pub rank: u32,
    pub games_played: u32,
    pub games_won: u32,
    pub games_lost: u32,
    pub season_games_played: u32,
    pub season_games_won: u32,
    pub season_games_lost: u32,
    pub personal_rating: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMember {
    character: Record,
    #[serde(default)]
    rank: u32,
    #[serde(default)]
    games_played: u32,
    #[serde(default)]
    games_won: u32,
    #[serde(default)]
    games_lost: u32,
    #[serde(default)]
    session_games_played: u32,
    #[serde(default)]
    session_games_won: u32,
    #[serde(default)]
    session_games_lost: u32,
    #[serde(default)]
    personal_rating: u32,
}

impl ArenaTeam {
    /// Team size the team was looked up by. Never fetches.
    pub fn size(&self) -> TeamSize {
        match self.key().id() {
            EntityId::Team { size, .. } => *size,
            _ => TeamSize::TwoVsTwo,
        }
    }

    pub async fn name(&self) -> Result<String> {
        self.record.get_as("name").await
    }

    pub fn realm(&self) -> Result<Realm> {
        self.session
            .realm_in(self.key().realm_slug().unwrap_or_default(), self.region())
    }

    pub async fn rating(&self) -> Result<u32> {
        self.record.get_as("rating").await
    }

    pub async fn ranking(&self) -> Result<u32> {
        self.record.get_as("ranking").await
    }

    pub async fn current_week_ranking(&self) -> Result<u32> {
        self.record.get_as("currentWeekRanking").await
    }

    pub async fn last_season_ranking(&self) -> Result<u32> {
        self.record.get_as("lastSessionRanking").await
    }

    /// Creation date as reported, e.g. `2012-01-05`.
    pub async fn created(&self) -> Result<String> {
        self.record.get_as("created").await
    }

    pub async fn games_played(&self) -> Result<u32> {
        self.record.get_as("gamesPlayed").await
    }

    pub async fn games_won(&self) -> Result<u32> {
        self.record.get_as("gamesWon").await
    }

    pub async fn games_lost(&self) -> Result<u32> {
        self.record.get_as("gamesLost").await
    }

    pub async fn season_games_played(&self) -> Result<u32> {
        self.record.get_as("sessionGamesPlayed").await
    }

    pub async fn season_games_won(&self) -> Result<u32> {
        self.record.get_as("sessionGamesWon").await
    }

    pub async fn season_games_lost(&self) -> Result<u32> {
        self.record.get_as("sessionGamesLost").await
    }

    /// `None` if the API reports something other than `horde` or `alliance`.
    pub async fn faction(&self) -> Result<Option<Faction>> {
        let side: String = self.record.get_as("side").await?;
        Ok(Faction::from_name(&side))
    }

    pub async fn members(&self) -> Result<Vec<ArenaTeamMember>> {
        let members: Vec<RawMember> = self.record.get_as("members").await?;
        let team_realm = self.key().realm_slug().unwrap_or_default();

        let mut roster = Vec::with_capacity(members.len());
        for member in members {
            let name = member
                .character
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default();
            let realm = member
                .character
                .get("realm")
                .and_then(Value::as_str)
                .unwrap_or(team_realm);
            let key = EntityKey::character(self.region(), realm, name);
            let record = self.session.seeded(key, member.character)?;

            roster.push(ArenaTeamMember {
                character: Character::new(self.session.clone(), record),
                rank: member.rank,
                games_played: member.games_played,
                games_won: member.games_won,
                games_lost: member.games_lost,
                season_games_played: member.session_games_played,
                season_games_won: member.session_games_won,
                season_games_lost: member.session_games_lost,
                personal_rating: member.personal_rating,
            });
        }
        Ok(roster)
    }
}
