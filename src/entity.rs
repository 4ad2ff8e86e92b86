//! Entity subsystem: walls, items and mobs stored in an arena with stable
//! ids, plus the top-level `World` container that owns them together with
//! the map geometry and camera.

use crate::error::MapError;
use crate::tilemap::{names, Camera, MapData, MapGeometry};
use crate::types::{Rect, SimConfig, Vec2};
use log::debug;

// ---------------------------------------------------------------------------
// Capabilities
// ---------------------------------------------------------------------------

/// Draw layers; lower layers are blitted first.
pub mod layers {
    pub const WALL: u8 = 1;
    pub const ITEMS: u8 = 1;
    pub const PLAYER: u8 = 2;
    pub const MOB: u8 = 2;
}

/// Inputs every entity sees during its per-tick update.
#[derive(Debug, Clone, Copy)]
pub struct TickContext {
    pub dt: f32,
    pub player_pos: Vec2,
    pub bob_range: f32,
    pub bob_speed: f32,
}

pub trait Updatable {
    fn update(&mut self, ctx: &TickContext);
}

pub trait Drawable {
    /// Screen-space draw command, or `None` for invisible sprites.
    fn draw(&self, camera: &Camera) -> Option<DrawCommand>;
}

/// Which sprite image to blit. Asset lookup is up to the render sink.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SpriteKind {
    Player,
    Wall,
    Mob,
    Item(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    pub sprite: SpriteKind,
    /// Destination rectangle in screen coordinates.
    pub rect: Rect,
    /// Heading in degrees (0 for unrotated sprites).
    pub rotation: f32,
    pub layer: u8,
}

// ---------------------------------------------------------------------------
// Walls
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Wall {
    pub rect: Rect,
    /// Collision-only obstacles are not drawn.
    pub visible: bool,
}

impl Drawable for Wall {
    fn draw(&self, camera: &Camera) -> Option<DrawCommand> {
        self.visible.then(|| DrawCommand {
            sprite: SpriteKind::Wall,
            rect: camera.apply(self.rect),
            rotation: 0.0,
            layer: layers::WALL,
        })
    }
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// Vertical bobbing animation, eased with in-out sine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bob {
    step: f32,
    dir: f32,
    offset: f32,
}

impl Default for Bob {
    fn default() -> Self {
        Self {
            step: 0.0,
            dir: 1.0,
            offset: 0.0,
        }
    }
}

impl Bob {
    /// Current vertical display offset in pixels.
    pub fn offset(&self) -> f32 {
        self.offset
    }

    fn advance(&mut self, range: f32, speed: f32) {
        if range <= 0.0 {
            return;
        }
        self.offset = range * (ease_in_out_sine(self.step / range) - 0.5) * self.dir;
        self.step += speed;
        if self.step > range {
            self.step = 0.0;
            self.dir = -self.dir;
        }
    }
}

fn ease_in_out_sine(t: f32) -> f32 {
    -0.5 * ((std::f32::consts::PI * t).cos() - 1.0)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub kind: String,
    /// Centre of the item (unbobbed).
    pub pos: Vec2,
    pub pickable: bool,
    pub bob: Option<Bob>,
    size: f32,
}

impl Item {
    /// A new item; every kind except the goal marker is pickable and bobs.
    pub fn new(kind: impl Into<String>, pos: Vec2, size: f32) -> Self {
        let kind = kind.into();
        let pickable = kind != names::GOAL;
        Self {
            kind,
            pos,
            pickable,
            bob: pickable.then(Bob::default),
            size,
        }
    }

    /// Rectangle used for overlap tests; ignores the bob offset.
    pub fn hit_rect(&self) -> Rect {
        Rect::from_center(self.pos, self.size, self.size)
    }
}

impl Updatable for Item {
    fn update(&mut self, ctx: &TickContext) {
        if let Some(bob) = self.bob.as_mut() {
            bob.advance(ctx.bob_range, ctx.bob_speed);
        }
    }
}

impl Drawable for Item {
    fn draw(&self, camera: &Camera) -> Option<DrawCommand> {
        let bob = self.bob.map_or(0.0, |b| b.offset());
        Some(DrawCommand {
            sprite: SpriteKind::Item(self.kind.clone()),
            rect: camera.apply(self.hit_rect().translated(Vec2::new(0.0, bob))),
            rotation: 0.0,
            layer: layers::ITEMS,
        })
    }
}

// ---------------------------------------------------------------------------
// Mobs
// ---------------------------------------------------------------------------

/// A stationary creature that keeps turning to face the player.
#[derive(Debug, Clone, PartialEq)]
pub struct Mob {
    pub pos: Vec2,
    pub rot: f32,
    size: f32,
}

impl Mob {
    pub fn new(pos: Vec2, size: f32) -> Self {
        Self { pos, rot: 0.0, size }
    }
}

impl Updatable for Mob {
    fn update(&mut self, ctx: &TickContext) {
        self.rot = (ctx.player_pos - self.pos).heading();
    }
}

impl Drawable for Mob {
    fn draw(&self, camera: &Camera) -> Option<DrawCommand> {
        Some(DrawCommand {
            sprite: SpriteKind::Mob,
            rect: camera.apply(Rect::from_center(self.pos, self.size, self.size)),
            rotation: self.rot,
            layer: layers::MOB,
        })
    }
}

// ---------------------------------------------------------------------------
// Arena
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Wall(Wall),
    Item(Item),
    Mob(Mob),
}

impl Updatable for Entity {
    fn update(&mut self, ctx: &TickContext) {
        match self {
            Entity::Wall(_) => {}
            Entity::Item(item) => item.update(ctx),
            Entity::Mob(mob) => mob.update(ctx),
        }
    }
}

impl Drawable for Entity {
    fn draw(&self, camera: &Camera) -> Option<DrawCommand> {
        match self {
            Entity::Wall(wall) => wall.draw(camera),
            Entity::Item(item) => item.draw(camera),
            Entity::Mob(mob) => mob.draw(camera),
        }
    }
}

/// Slot arena. Ids are never reused, so an id held across ticks either still
/// names the same entity or nothing at all.
#[derive(Debug, Default)]
pub struct EntityArena {
    slots: Vec<Option<Entity>>,
    live: usize,
}

impl EntityArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entity: Entity) -> EntityId {
        let id = EntityId(self.slots.len() as u32);
        self.slots.push(Some(entity));
        self.live += 1;
        id
    }

    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let removed = self.slots.get_mut(id.0 as usize)?.take();
        if removed.is_some() {
            self.live -= 1;
        }
        removed
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.slots.get(id.0 as usize)?.as_ref()
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Live entities in id order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|e| (EntityId(i as u32), e)))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.slots.iter_mut().flatten()
    }

    pub fn walls(&self) -> impl Iterator<Item = &Wall> {
        self.iter().filter_map(|(_, e)| match e {
            Entity::Wall(w) => Some(w),
            _ => None,
        })
    }

    pub fn items(&self) -> impl Iterator<Item = (EntityId, &Item)> {
        self.iter().filter_map(|(id, e)| match e {
            Entity::Item(item) => Some((id, item)),
            _ => None,
        })
    }

    pub fn mobs(&self) -> impl Iterator<Item = &Mob> {
        self.iter().filter_map(|(_, e)| match e {
            Entity::Mob(m) => Some(m),
            _ => None,
        })
    }
}

// ---------------------------------------------------------------------------
// World (data container)
// ---------------------------------------------------------------------------

/// Map geometry, every non-player entity and the camera. Only the
/// simulation loop ever holds a `&mut World`.
pub struct World {
    pub geometry: MapGeometry,
    pub entities: EntityArena,
    pub camera: Camera,
}

impl World {
    pub fn new(geometry: MapGeometry, camera: Camera) -> Self {
        Self {
            geometry,
            entities: EntityArena::new(),
            camera,
        }
    }

    /// Build a world from level data and return it with the player spawn.
    pub fn from_map(data: &MapData, config: &SimConfig) -> Result<(Self, Vec2), MapError> {
        let geometry = data.geometry();
        let camera = Camera::new(config.screen_width, config.screen_height, &geometry);
        let mut world = Self::new(geometry, camera);
        let mut spawn = None;

        for object in &data.objects {
            match object.name.as_str() {
                names::PLAYER => spawn = Some(object.center()),
                names::WALL => {
                    world.add_wall(object.rect(), data.visible_walls)?;
                }
                names::MOB => {
                    world.spawn_mob(object.center());
                }
                kind if names::ITEM_KINDS.contains(&kind) => {
                    world.spawn_item(kind, object.center());
                }
                other => debug!("Ignoring map object '{}' at {}", other, object.center()),
            }
        }

        let spawn = spawn.ok_or(MapError::MissingPlayer)?;
        debug!(
            "Built world {}x{} with {} entities, player at {}",
            geometry.width,
            geometry.height,
            world.entities.len(),
            spawn
        );
        Ok((world, spawn))
    }

    pub fn add_wall(&mut self, rect: Rect, visible: bool) -> Result<EntityId, MapError> {
        if !self.geometry.bounds().contains_rect(&rect) {
            return Err(MapError::WallOutOfBounds {
                rect,
                width: self.geometry.width,
                height: self.geometry.height,
            });
        }
        Ok(self.entities.insert(Entity::Wall(Wall { rect, visible })))
    }

    pub fn spawn_item(&mut self, kind: &str, pos: Vec2) -> EntityId {
        let item = Item::new(kind, pos, self.geometry.tile_size);
        self.entities.insert(Entity::Item(item))
    }

    pub fn spawn_mob(&mut self, pos: Vec2) -> EntityId {
        self.entities
            .insert(Entity::Mob(Mob::new(pos, self.geometry.tile_size)))
    }

    /// Collision rectangles of every wall.
    pub fn wall_rects(&self) -> impl Iterator<Item = Rect> + '_ {
        self.entities.walls().map(|w| w.rect)
    }

    pub fn item_count(&self) -> usize {
        self.entities.items().count()
    }

    pub fn update(&mut self, ctx: &TickContext) {
        for entity in self.entities.iter_mut() {
            entity.update(ctx);
        }
    }

    /// Draw commands for every visible entity, in arena order.
    pub fn draw_commands(&self) -> Vec<DrawCommand> {
        self.entities
            .iter()
            .filter_map(|(_, e)| e.draw(&self.camera))
            .collect()
    }
}
