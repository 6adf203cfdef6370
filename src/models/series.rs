use serde::{Deserialize, Serialize};

use crate::domain::SeriesId;

/// Series details as returned by the metadata provider with
/// `append_to_response=credits,videos`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesDetails {
    pub id: SeriesId,
    pub name: String,
    #[serde(default)]
    pub overview: String,
    pub poster_path: Option<String>,
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub vote_average: f32,
    #[serde(default)]
    pub genres: Vec<Genre>,
    /// Missing or null on some entries; treated as zero declared seasons.
    pub number_of_seasons: Option<u32>,
    #[serde(default)]
    pub credits: Credits,
    #[serde(default)]
    pub videos: Videos,
}

impl SeriesDetails {
    #[must_use]
    pub fn declared_seasons(&self) -> u32 {
        self.number_of_seasons.unwrap_or(0)
    }

    /// Year of the first air date, if the date is present and well formed.
    #[must_use]
    pub fn first_air_year(&self) -> Option<i32> {
        let date = self.first_air_date.as_deref()?;
        chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .ok()
            .map(|d| chrono::Datelike::year(&d))
    }

    #[must_use]
    pub fn poster(&self) -> &str {
        self.poster_path.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Genre {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<CastMember>,
    #[serde(default)]
    pub crew: Vec<CrewMember>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CastMember {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub character: String,
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrewMember {
    pub id: u64,
    pub name: String,
    pub job: String,
    pub profile_path: Option<String>,
}

/// One person of the crew with every distinct job they hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupedCrewMember {
    pub id: u64,
    pub name: String,
    pub jobs: Vec<String>,
    pub profile_path: Option<String>,
}

/// Merges crew entries by person id.
///
/// People keep the order in which they first appear; each job is listed once,
/// in first-seen order.
#[must_use]
pub fn group_crew(crew: &[CrewMember]) -> Vec<GroupedCrewMember> {
    let mut grouped: Vec<GroupedCrewMember> = Vec::new();

    for member in crew {
        if let Some(existing) = grouped.iter_mut().find(|g| g.id == member.id) {
            if !existing.jobs.contains(&member.job) {
                existing.jobs.push(member.job.clone());
            }
        } else {
            grouped.push(GroupedCrewMember {
                id: member.id,
                name: member.name.clone(),
                jobs: vec![member.job.clone()],
                profile_path: member.profile_path.clone(),
            });
        }
    }

    grouped
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Videos {
    #[serde(default)]
    pub results: Vec<Video>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    pub key: String,
    pub site: String,
    #[serde(rename = "type")]
    pub video_type: String,
}

/// A series suggested alongside the one being viewed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: SeriesId,
    pub name: String,
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: f32,
    /// Not checked against any source; recommendations are always offered.
    #[serde(default = "default_true")]
    pub available: bool,
}

const fn default_true() -> bool {
    true
}
